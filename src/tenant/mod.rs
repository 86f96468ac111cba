//! Tenant registry
//!
//! Maps tenant identifiers to the region/endpoint pair their storage client
//! binds to. The registry is built once from `Settings` at startup and never
//! mutated afterwards; iteration order is lexicographic by tenant id, which
//! is also the order the driver processes tenants in.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::config::TenantSettings;

/// A tenant id with no entry in the registry.
#[derive(Debug, Error)]
#[error("unknown tenant {tenant_id:?}")]
pub struct UnknownTenant {
    pub tenant_id: String,
}

/// Region and endpoint binding for one tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantConfig {
    pub tenant_id: String,
    /// Storage service region, e.g. "us-east-1".
    pub region: String,
    /// Alternate S3-compatible endpoint (LocalStack, MinIO, ...).
    /// `None` means the region's production endpoint.
    pub endpoint: Option<String>,
}

/// Immutable tenant lookup table, keyed by tenant id.
#[derive(Debug, Clone, Default)]
pub struct TenantRegistry {
    tenants: BTreeMap<String, TenantConfig>,
}

impl TenantRegistry {
    /// Build a registry from configured tenant settings.
    pub fn from_settings(tenants: &BTreeMap<String, TenantSettings>) -> Self {
        Self::from_configs(tenants.iter().map(|(tenant_id, settings)| TenantConfig {
            tenant_id: tenant_id.clone(),
            region: settings.region.clone(),
            endpoint: settings.endpoint.clone(),
        }))
    }

    /// Build a registry from explicit tenant configurations.
    pub fn from_configs(configs: impl IntoIterator<Item = TenantConfig>) -> Self {
        let tenants = configs
            .into_iter()
            .map(|config| (config.tenant_id.clone(), config))
            .collect();
        Self { tenants }
    }

    /// Look up one tenant's configuration.
    pub fn lookup(&self, tenant_id: &str) -> Result<&TenantConfig, UnknownTenant> {
        self.tenants.get(tenant_id).ok_or_else(|| UnknownTenant {
            tenant_id: tenant_id.to_string(),
        })
    }

    /// Tenants in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &TenantConfig> {
        self.tenants.values()
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(tenant_id: &str, region: &str) -> TenantConfig {
        TenantConfig {
            tenant_id: tenant_id.to_string(),
            region: region.to_string(),
            endpoint: None,
        }
    }

    #[test]
    fn test_lookup_known_tenant() {
        let registry = TenantRegistry::from_configs([
            config("tenant1", "us-east-1"),
            config("tenant2", "eu-central-1"),
        ]);

        let tenant = registry.lookup("tenant2").unwrap();
        assert_eq!(tenant.region, "eu-central-1");
        assert_eq!(tenant.endpoint, None);
    }

    #[test]
    fn test_lookup_unknown_tenant() {
        let registry = TenantRegistry::from_configs([config("tenant1", "us-east-1")]);

        let err = registry.lookup("ghost").unwrap_err();
        assert_eq!(err.tenant_id, "ghost");
        assert_eq!(err.to_string(), "unknown tenant \"ghost\"");
    }

    #[test]
    fn test_iteration_order() {
        let registry = TenantRegistry::from_configs([
            config("zeta", "us-east-1"),
            config("alpha", "us-east-1"),
            config("mid", "us-east-1"),
        ]);

        let order: Vec<&str> = registry.iter().map(|t| t.tenant_id.as_str()).collect();
        assert_eq!(order, vec!["alpha", "mid", "zeta"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_empty_registry() {
        let registry = TenantRegistry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }
}

//! Configuration module for the tenant demo
//!
//! Layered settings: optional TOML files plus `S3_DEMO_*` environment
//! variables over compiled-in defaults. The defaults alone describe a
//! complete run against a LocalStack endpoint, so the binary works with no
//! external configuration at all.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main application settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub run: RunSettings,
    #[serde(default = "default_tenants")]
    pub tenants: BTreeMap<String, TenantSettings>,
}

/// Bucket naming and listing options
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Bucket provisioned for every tenant's upload.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Prefix the listing step filters on; empty lists everything.
    #[serde(default)]
    pub list_prefix: String,
}

/// Run-wide workflow options
#[derive(Debug, Clone, Deserialize)]
pub struct RunSettings {
    /// Whether a failing tenant ends the run or later tenants still get
    /// their turn.
    #[serde(default)]
    pub on_error: FailurePolicy,
    /// Directory sample files are written into.
    #[serde(default = "default_sample_dir")]
    pub sample_dir: PathBuf,
}

/// Failure isolation between tenants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The first failing tenant ends the whole run.
    #[default]
    Abort,
    /// Failing tenants are recorded and the remaining tenants still run.
    Continue,
}

/// One tenant's storage binding
#[derive(Debug, Clone, Deserialize)]
pub struct TenantSettings {
    /// Storage service region, e.g. "us-east-1".
    pub region: String,
    /// Alternate S3-compatible endpoint (LocalStack, MinIO, ...). Absent
    /// means the region's production endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_bucket() -> String {
    "test-bucket".to_string()
}

fn default_sample_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_tenants() -> BTreeMap<String, TenantSettings> {
    BTreeMap::from([(
        "tenant1".to_string(),
        TenantSettings {
            region: "us-east-1".to_string(),
            endpoint: Some("http://localhost:4566".to_string()),
        },
    )])
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (prefixed with S3_DEMO_)
    /// 2. config/local.toml (gitignored)
    /// 3. config/default.toml
    /// 4. Compiled-in defaults (a single LocalStack tenant)
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        let builder = Config::builder()
            // Start with default configuration
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add local overrides (gitignored)
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment variables (S3_DEMO_STORAGE__BUCKET, etc.)
            .add_source(
                Environment::with_prefix("S3_DEMO")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            storage: StorageSettings::default(),
            run: RunSettings::default(),
            tenants: default_tenants(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            bucket: default_bucket(),
            list_prefix: String::new(),
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        RunSettings {
            on_error: FailurePolicy::default(),
            sample_dir: default_sample_dir(),
        }
    }
}

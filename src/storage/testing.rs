//! Test doubles for the storage contract.
//!
//! `FakeStore` keeps uploaded keys in memory and can be scripted to fail at
//! a given step; clones share state so tests keep a handle for inspection
//! after handing a clone to the code under test.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::tenant::TenantConfig;

use super::traits::{
    BucketListing, ListError, ObjectStore, ProvisionError, ProvisionOutcome, StoreFactory,
    UploadError, UploadResult,
};

/// Which storage step a fake store fails at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailAt {
    Provision,
    Upload,
    List,
}

#[derive(Clone)]
pub(crate) struct FakeStore {
    calls: Arc<Mutex<Vec<String>>>,
    keys: Arc<Mutex<Vec<String>>>,
    provisioned: Arc<Mutex<bool>>,
    first_outcome: ProvisionOutcome,
    fail_at: Option<FailAt>,
}

impl FakeStore {
    pub(crate) fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            keys: Arc::new(Mutex::new(Vec::new())),
            provisioned: Arc::new(Mutex::new(false)),
            first_outcome: ProvisionOutcome::Created,
            fail_at: None,
        }
    }

    /// Script the outcome of the first `ensure_bucket` call.
    pub(crate) fn with_first_outcome(mut self, outcome: ProvisionOutcome) -> Self {
        self.first_outcome = outcome;
        self
    }

    pub(crate) fn failing_at(mut self, step: FailAt) -> Self {
        self.fail_at = Some(step);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn stored_keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn ensure_bucket(&self, bucket: &str) -> Result<ProvisionOutcome, ProvisionError> {
        self.record(format!("ensure_bucket {bucket}"));

        if self.fail_at == Some(FailAt::Provision) {
            return Err(ProvisionError {
                bucket: bucket.to_string(),
                detail: "scripted provision failure".to_string(),
            });
        }

        // A foreign-owned bucket stays foreign; otherwise the first call
        // creates and later calls find it owned.
        if self.first_outcome == ProvisionOutcome::AlreadyExists {
            return Ok(ProvisionOutcome::AlreadyExists);
        }
        let mut provisioned = self.provisioned.lock().unwrap();
        if *provisioned {
            return Ok(ProvisionOutcome::AlreadyOwned);
        }
        *provisioned = true;
        Ok(self.first_outcome)
    }

    async fn upload_file(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
    ) -> Result<UploadResult, UploadError> {
        self.record(format!("upload_file {bucket}/{key}"));

        if self.fail_at == Some(FailAt::Upload) {
            return Err(UploadError {
                local_path: local_path.to_path_buf(),
                bucket: bucket.to_string(),
                key: key.to_string(),
                detail: "scripted upload failure".to_string(),
            });
        }

        // Like the real store, a missing local file is an upload failure.
        let size = std::fs::metadata(local_path)
            .map(|meta| meta.len())
            .map_err(|e| UploadError {
                local_path: local_path.to_path_buf(),
                bucket: bucket.to_string(),
                key: key.to_string(),
                detail: e.to_string(),
            })?;

        // Same key again overwrites instead of duplicating, like the service.
        let mut keys = self.keys.lock().unwrap();
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
            keys.sort();
        }

        Ok(UploadResult {
            bucket: bucket.to_string(),
            key: key.to_string(),
            size,
            etag: None,
        })
    }

    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<BucketListing, ListError> {
        self.record(format!("list_objects {bucket} {prefix:?}"));

        if self.fail_at == Some(FailAt::List) {
            return Err(ListError {
                bucket: bucket.to_string(),
                prefix: prefix.to_string(),
                detail: "scripted list failure".to_string(),
            });
        }

        let keys = self
            .keys
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        Ok(BucketListing::new(bucket, prefix, keys))
    }
}

/// Store factory handing out pre-built fakes by tenant id. Tenants without
/// a scripted store get a fresh healthy one.
#[derive(Clone)]
pub(crate) struct FakeFactory {
    stores: BTreeMap<String, FakeStore>,
    connected: Arc<Mutex<Vec<String>>>,
}

impl FakeFactory {
    pub(crate) fn new() -> Self {
        Self {
            stores: BTreeMap::new(),
            connected: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn with_store(mut self, tenant_id: &str, store: FakeStore) -> Self {
        self.stores.insert(tenant_id.to_string(), store);
        self
    }

    /// Tenant ids `connect` was called for, in call order.
    pub(crate) fn connected(&self) -> Vec<String> {
        self.connected.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoreFactory for FakeFactory {
    async fn connect(&self, tenant: &TenantConfig) -> Box<dyn ObjectStore> {
        self.connected.lock().unwrap().push(tenant.tenant_id.clone());
        let store = self
            .stores
            .get(&tenant.tenant_id)
            .cloned()
            .unwrap_or_else(FakeStore::new);
        Box::new(store)
    }
}

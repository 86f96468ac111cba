//! Per-tenant provisioning workflow
//!
//! A linear sequence with no branching: write the sample file, build the
//! tenant's storage client, make sure the bucket exists, upload, list and
//! print. The first failing step ends the workflow for that tenant, and
//! steps already completed are not rolled back.

mod driver;

pub use driver::{RunSummary, TenantOutcome, WorkflowDriver};

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::sample::{LocalIoError, SampleFileProducer};
use crate::storage::{
    BucketListing, ListError, ObjectStore, ProvisionError, ProvisionOutcome, StoreFactory,
    UploadError, UploadResult,
};
use crate::tenant::{TenantRegistry, UnknownTenant};

/// Any step's failure, propagated unchanged. Each step already logged and
/// described its own error; nothing is wrapped on the way up.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    UnknownTenant(#[from] UnknownTenant),

    #[error(transparent)]
    SampleFile(#[from] LocalIoError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    List(#[from] ListError),
}

/// Everything one successful tenant run produced.
#[derive(Debug)]
pub struct TenantReport {
    pub tenant_id: String,
    pub sample_path: PathBuf,
    pub provision: ProvisionOutcome,
    pub upload: UploadResult,
    pub listing: BucketListing,
}

/// One tenant's pass through the provisioning steps.
pub struct TenantWorkflow<'a> {
    registry: &'a TenantRegistry,
    factory: &'a dyn StoreFactory,
    files: &'a SampleFileProducer,
    bucket: &'a str,
    list_prefix: &'a str,
}

impl<'a> TenantWorkflow<'a> {
    pub fn new(
        registry: &'a TenantRegistry,
        factory: &'a dyn StoreFactory,
        files: &'a SampleFileProducer,
        bucket: &'a str,
        list_prefix: &'a str,
    ) -> Self {
        Self {
            registry,
            factory,
            files,
            bucket,
            list_prefix,
        }
    }

    /// Run every step for one tenant and report what came out of each.
    pub async fn run(&self, tenant_id: &str) -> Result<TenantReport, WorkflowError> {
        let tenant = self.registry.lookup(tenant_id)?;
        let sample_path = self.files.create(tenant_id).await?;
        let store = self.factory.connect(tenant).await;
        self.run_with_store(store.as_ref(), tenant_id, &sample_path)
            .await
    }

    /// The storage steps, given an already-built client and sample file.
    async fn run_with_store(
        &self,
        store: &dyn ObjectStore,
        tenant_id: &str,
        sample_path: &Path,
    ) -> Result<TenantReport, WorkflowError> {
        // Objects are keyed by the sample file's base name.
        let key = sample_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| SampleFileProducer::file_name(tenant_id));

        let provision = store.ensure_bucket(self.bucket).await?;
        if provision == ProvisionOutcome::AlreadyExists {
            warn!(
                "Bucket {} is {}; the upload may be rejected",
                self.bucket, provision
            );
        }

        let upload = store.upload_file(sample_path, self.bucket, &key).await?;
        let listing = store.list_objects(self.bucket, self.list_prefix).await?;

        println!("\nFiles in S3 bucket:");
        print!("{}", listing.render());

        Ok(TenantReport {
            tenant_id: tenant_id.to_string(),
            sample_path: sample_path.to_path_buf(),
            provision,
            upload,
            listing,
        })
    }
}

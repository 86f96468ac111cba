//! Storage trait definitions
//!
//! This module defines the contract the tenant workflow drives: provision a
//! bucket, upload a local file, list keys under a prefix. The production
//! implementation talks to S3; tests substitute their own.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::error;

use crate::tenant::TenantConfig;

// ============================================================================
// Error Types
// ============================================================================

/// Bucket creation failed for a reason other than the bucket existing.
#[derive(Debug, Error)]
#[error("could not create bucket {bucket}: {detail}")]
pub struct ProvisionError {
    pub bucket: String,
    pub detail: String,
}

/// Upload failed, either reading the local file or on the service side.
#[derive(Debug, Error)]
#[error("could not upload {} to {bucket}/{key}: {detail}", .local_path.display())]
pub struct UploadError {
    pub local_path: PathBuf,
    pub bucket: String,
    pub key: String,
    pub detail: String,
}

/// Listing the bucket failed.
#[derive(Debug, Error)]
#[error("could not list objects in {bucket} under prefix {prefix:?}: {detail}")]
pub struct ListError {
    pub bucket: String,
    pub prefix: String,
    pub detail: String,
}

/// Logs a failed storage call once, at the point of occurrence, then hands
/// the error back unchanged for the caller to propagate.
pub(crate) fn log_failure<E: fmt::Display>(operation: &'static str, err: E) -> E {
    error!("Storage call {} failed: {}", operation, err);
    err
}

// ============================================================================
// Result Types
// ============================================================================

/// What `ensure_bucket` found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The bucket did not exist and was created by this call.
    Created,
    /// The bucket already exists and belongs to this account.
    AlreadyOwned,
    /// The bucket name is taken by another account. The service decides
    /// whether later operations against it succeed.
    AlreadyExists,
}

impl fmt::Display for ProvisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionOutcome::Created => write!(f, "created"),
            ProvisionOutcome::AlreadyOwned => write!(f, "already owned by this account"),
            ProvisionOutcome::AlreadyExists => write!(f, "already taken by another account"),
        }
    }
}

/// Outcome of a completed upload.
#[derive(Debug, Clone)]
pub struct UploadResult {
    pub bucket: String,
    pub key: String,
    /// Size in bytes
    pub size: u64,
    /// ETag reported by the service
    pub etag: Option<String>,
}

/// Object keys returned for one bucket and prefix, in service return order.
#[derive(Debug, Clone)]
pub struct BucketListing {
    bucket: String,
    prefix: String,
    keys: Vec<String>,
}

impl BucketListing {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>, keys: Vec<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
            keys,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Render the listing for console output, one `-<TAB>key` line per
    /// object. An empty listing renders as an empty string.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for key in &self.keys {
            out.push_str("-\t");
            out.push_str(key);
            out.push('\n');
        }
        out
    }
}

// ============================================================================
// Traits
// ============================================================================

/// The storage operations the tenant workflow needs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create `bucket` if it does not exist yet. Finding the bucket already
    /// there is a reusable outcome, not an error.
    async fn ensure_bucket(&self, bucket: &str) -> Result<ProvisionOutcome, ProvisionError>;

    /// Upload the file at `local_path` to `bucket` under `key`, replacing
    /// any object already stored under that key.
    async fn upload_file(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
    ) -> Result<UploadResult, UploadError>;

    /// List object keys in `bucket` that start with `prefix`. The empty
    /// prefix matches everything; a bucket with no matching objects yields
    /// an empty listing. Single page, like the console walkthrough this
    /// backs.
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<BucketListing, ListError>;
}

/// Builds the storage client for one tenant.
#[async_trait]
pub trait StoreFactory: Send + Sync {
    async fn connect(&self, tenant: &TenantConfig) -> Box<dyn ObjectStore>;
}

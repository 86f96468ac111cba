//! S3 implementation of the storage contract
//!
//! Thin passthroughs to aws-sdk-s3 with per-tenant client construction. An
//! endpoint override points the client at a local or self-hosted
//! S3-compatible service (LocalStack, MinIO, ...) instead of the regional
//! production endpoint. Credential resolution stays with the SDK's default
//! provider chain.

use std::path::Path;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::Client as S3Client;
use tracing::{debug, info, instrument};

use crate::tenant::TenantConfig;

use super::traits::{
    log_failure, BucketListing, ListError, ObjectStore, ProvisionError, ProvisionOutcome,
    StoreFactory, UploadError, UploadResult,
};

/// S3 client bound to one tenant's region and endpoint.
#[derive(Clone)]
pub struct S3Store {
    client: S3Client,
    region: String,
}

impl S3Store {
    /// Create a client for one tenant. No network call happens here; the
    /// first storage operation is what hits the service.
    pub async fn for_tenant(tenant: &TenantConfig) -> Self {
        debug!(
            "Creating S3 client for tenant {} (region {}, endpoint {})",
            tenant.tenant_id,
            tenant.region,
            tenant.endpoint.as_deref().unwrap_or("default")
        );

        let shared_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(tenant.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);
        if let Some(endpoint) = &tenant.endpoint {
            // Local stacks resolve buckets by path, not by virtual host.
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: S3Client::from_conf(builder.build()),
            region: tenant.region.clone(),
        }
    }
}

/// Helper to classify a create_bucket failure as the bucket already being
/// there, and under whose account.
fn already_exists_outcome(err: &CreateBucketError) -> Option<ProvisionOutcome> {
    if err.is_bucket_already_owned_by_you() {
        Some(ProvisionOutcome::AlreadyOwned)
    } else if err.is_bucket_already_exists() {
        Some(ProvisionOutcome::AlreadyExists)
    } else {
        None
    }
}

/// Regions other than us-east-1 must name themselves in the create call;
/// us-east-1 rejects an explicit constraint instead.
fn location_constraint_for(region: &str) -> Option<CreateBucketConfiguration> {
    if region == "us-east-1" {
        return None;
    }
    Some(
        CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(region))
            .build(),
    )
}

/// Flatten an error and its sources into one line, so service failures keep
/// their underlying cause when rendered.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}

#[async_trait]
impl ObjectStore for S3Store {
    #[instrument(skip(self))]
    async fn ensure_bucket(&self, bucket: &str) -> Result<ProvisionOutcome, ProvisionError> {
        info!("Creating bucket {} in region {}", bucket, self.region);

        let mut request = self.client.create_bucket().bucket(bucket);
        if let Some(constraint) = location_constraint_for(&self.region) {
            request = request.create_bucket_configuration(constraint);
        }

        match request.send().await {
            Ok(_) => {
                info!("Bucket {} created", bucket);
                Ok(ProvisionOutcome::Created)
            }
            Err(e) => match e.as_service_error().and_then(already_exists_outcome) {
                Some(outcome) => {
                    info!("Bucket {} {}", bucket, outcome);
                    Ok(outcome)
                }
                None => Err(log_failure(
                    "create_bucket",
                    ProvisionError {
                        bucket: bucket.to_string(),
                        detail: error_chain(&e),
                    },
                )),
            },
        }
    }

    #[instrument(skip(self), fields(local_path = %local_path.display()))]
    async fn upload_file(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
    ) -> Result<UploadResult, UploadError> {
        info!("Uploading {} to {}/{}", local_path.display(), bucket, key);

        let upload_error = |detail: String| UploadError {
            local_path: local_path.to_path_buf(),
            bucket: bucket.to_string(),
            key: key.to_string(),
            detail,
        };

        let size = tokio::fs::metadata(local_path)
            .await
            .map_err(|e| log_failure("upload_file", upload_error(error_chain(&e))))?
            .len();

        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| log_failure("upload_file", upload_error(error_chain(&e))))?;

        let result = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| log_failure("put_object", upload_error(error_chain(&e))))?;

        info!("Uploaded to {}/{} ({} bytes)", bucket, key, size);

        Ok(UploadResult {
            bucket: bucket.to_string(),
            key: key.to_string(),
            size,
            etag: result.e_tag().map(String::from),
        })
    }

    #[instrument(skip(self))]
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<BucketListing, ListError> {
        debug!("Listing objects in {} with prefix {:?}", bucket, prefix);

        let result = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .send()
            .await
            .map_err(|e| {
                log_failure(
                    "list_objects_v2",
                    ListError {
                        bucket: bucket.to_string(),
                        prefix: prefix.to_string(),
                        detail: error_chain(&e),
                    },
                )
            })?;

        // An empty bucket comes back with no contents at all; that is an
        // empty listing, not an error.
        let keys: Vec<String> = result
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|object| object.key)
            .collect();

        debug!("Listed {} objects in {}", keys.len(), bucket);

        Ok(BucketListing::new(bucket, prefix, keys))
    }
}

/// Production store factory: one `S3Store` per tenant.
pub struct S3StoreFactory;

#[async_trait]
impl StoreFactory for S3StoreFactory {
    async fn connect(&self, tenant: &TenantConfig) -> Box<dyn ObjectStore> {
        Box::new(S3Store::for_tenant(tenant).await)
    }
}

//! Storage module for tenant buckets
//!
//! Defines the object-store contract the workflow drives and its S3
//! implementation. Anything S3-compatible works through an endpoint
//! override, so we use the AWS SDK.

mod s3;
mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use s3::{S3Store, S3StoreFactory};
pub use traits::{
    BucketListing, ListError, ObjectStore, ProvisionError, ProvisionOutcome, StoreFactory,
    UploadError, UploadResult,
};

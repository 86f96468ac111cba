//! Multi-tenant S3 provisioning walkthrough
//!
//! For every configured tenant: write a small sample file, build a storage
//! client bound to the tenant's region and endpoint, make sure the shared
//! demo bucket exists, upload the file and print what the bucket now holds.
//! Storage calls are direct passthroughs to S3 (or any S3-compatible
//! service behind an endpoint override); the interesting parts are the
//! per-tenant client wiring and the explicit failure-isolation policy.

pub mod config;
pub mod sample;
pub mod storage;
pub mod tenant;
pub mod workflow;

//! Sample file creation
//!
//! Each tenant gets a small local file whose content is the tenant id; the
//! upload step pushes it into the tenant's bucket. Files are deliberately
//! left behind after the run so the uploaded bytes can be compared against
//! the local source.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

/// Local filesystem failure while writing a sample file.
#[derive(Debug, Error)]
#[error("could not write sample file {}: {source}", .path.display())]
pub struct LocalIoError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Writes per-tenant sample files into one directory.
#[derive(Debug, Clone)]
pub struct SampleFileProducer {
    dir: PathBuf,
}

impl SampleFileProducer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Deterministic file name for a tenant's sample file.
    pub fn file_name(tenant_id: &str) -> String {
        format!("sample-{tenant_id}.txt")
    }

    /// Write the sample file for `tenant_id`, replacing any previous one,
    /// and return its path.
    pub async fn create(&self, tenant_id: &str) -> Result<PathBuf, LocalIoError> {
        info!("Creating sample file for tenant {tenant_id}");

        let path = self.dir.join(Self::file_name(tenant_id));
        tokio::fs::write(&path, tenant_id)
            .await
            .map_err(|source| LocalIoError {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}

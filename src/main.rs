//! S3 Tenant Demo
//!
//! Walks every configured tenant through bucket provisioning, a sample file
//! upload and a listing of the bucket contents, one tenant at a time.
//! Points at LocalStack out of the box; region, endpoint and bucket all come
//! from configuration.

use anyhow::Context;
use tracing::info;

use s3_tenant_demo::config::Settings;
use s3_tenant_demo::workflow::WorkflowDriver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (SDK credentials included)
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("s3_tenant_demo=info".parse()?),
        )
        .init();

    // Load configuration
    let settings = Settings::load().context("Failed to load configuration")?;

    info!(
        "Starting s3-tenant-demo v{} ({} tenants, bucket {})",
        env!("CARGO_PKG_VERSION"),
        settings.tenants.len(),
        settings.storage.bucket
    );

    let driver = WorkflowDriver::new(settings);
    if driver.registry().is_empty() {
        info!("No tenants configured, nothing to do");
        return Ok(());
    }

    let summary = driver.run_all().await?;
    if summary.failed > 0 {
        anyhow::bail!(
            "{} of {} tenants failed",
            summary.failed,
            summary.outcomes.len()
        );
    }

    Ok(())
}

//! Sequential multi-tenant driver
//!
//! Runs the provisioning workflow once per registered tenant, strictly one
//! tenant at a time, with console banners framing each tenant's output.
//! Failure isolation between tenants is a policy choice: abort the run at
//! the first failure, or record it and give the remaining tenants their
//! turn.

use std::time::Instant;

use tracing::{error, info};

use crate::config::{FailurePolicy, Settings};
use crate::sample::SampleFileProducer;
use crate::storage::{S3StoreFactory, StoreFactory};
use crate::tenant::TenantRegistry;

use super::{TenantReport, TenantWorkflow, WorkflowError};

/// How one tenant's run ended.
#[derive(Debug)]
pub struct TenantOutcome {
    pub tenant_id: String,
    pub result: Result<TenantReport, WorkflowError>,
}

/// Result of a whole run across tenants
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Number of tenants that completed every step
    pub succeeded: usize,
    /// Number of tenants that failed
    pub failed: usize,
    /// Individual outcomes, in processing order
    pub outcomes: Vec<TenantOutcome>,
    /// Total time in milliseconds
    pub total_time_ms: u64,
}

impl RunSummary {
    fn record(&mut self, tenant_id: &str, result: Result<TenantReport, WorkflowError>) {
        match result {
            Ok(_) => self.succeeded += 1,
            Err(_) => self.failed += 1,
        }
        self.outcomes.push(TenantOutcome {
            tenant_id: tenant_id.to_string(),
            result,
        });
    }
}

/// Processes every registered tenant in registry order.
pub struct WorkflowDriver {
    settings: Settings,
    registry: TenantRegistry,
    files: SampleFileProducer,
    factory: Box<dyn StoreFactory>,
}

impl WorkflowDriver {
    /// Driver with the production S3 store factory.
    pub fn new(settings: Settings) -> Self {
        Self::with_factory(settings, Box::new(S3StoreFactory))
    }

    /// Driver with an injected store factory.
    pub fn with_factory(settings: Settings, factory: Box<dyn StoreFactory>) -> Self {
        let registry = TenantRegistry::from_settings(&settings.tenants);
        let files = SampleFileProducer::new(&settings.run.sample_dir);
        Self {
            settings,
            registry,
            files,
            factory,
        }
    }

    pub fn registry(&self) -> &TenantRegistry {
        &self.registry
    }

    /// Run the workflow for every tenant in registry order.
    ///
    /// Under `FailurePolicy::Abort` the first failure comes back as this
    /// function's error; under `Continue` it is recorded in the summary and
    /// the remaining tenants still run.
    pub async fn run_all(&self) -> Result<RunSummary, WorkflowError> {
        let workflow = TenantWorkflow::new(
            &self.registry,
            self.factory.as_ref(),
            &self.files,
            &self.settings.storage.bucket,
            &self.settings.storage.list_prefix,
        );

        let start = Instant::now();
        let mut summary = RunSummary::default();

        for tenant in self.registry.iter() {
            let tenant_id = tenant.tenant_id.as_str();
            println!("\n\n======= Processing tenant {tenant_id} =======\n");

            match workflow.run(tenant_id).await {
                Ok(report) => {
                    summary.record(tenant_id, Ok(report));
                    println!("\n======= Finished processing tenant {tenant_id} =======\n\n");
                }
                Err(err) => {
                    if self.settings.run.on_error == FailurePolicy::Abort {
                        error!("Tenant {} failed, aborting the run: {}", tenant_id, err);
                        return Err(err);
                    }
                    error!("Tenant {} failed, continuing: {}", tenant_id, err);
                    summary.record(tenant_id, Err(err));
                }
            }
        }

        summary.total_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Completed run for {} tenants: {} succeeded ({} failed) in {}ms",
            summary.outcomes.len(),
            summary.succeeded,
            summary.failed,
            summary.total_time_ms
        );

        Ok(summary)
    }
}

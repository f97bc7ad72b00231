use async_trait::async_trait;
use stackup_exec::{SupervisedProcess, start};
use stackup_model::{SchedulerConfig, ServiceEndpoint};
use tracing::info;

use crate::{
    error::TeardownCause,
    launcher::{LaunchContext, LaunchFailure, ManagedService, stop_process},
};

/// Workload scheduler running in dev mode.
///
/// Bound to a fixed, well-known address rather than an allocated port,
/// because the control plane finds it there by convention.
#[derive(Debug)]
pub struct SchedulerService {
    endpoint: ServiceEndpoint,
    process: SupervisedProcess,
}

impl SchedulerService {
    pub const NAME: &'static str = "scheduler";

    pub async fn launch(
        cfg: &SchedulerConfig,
        ctx: &LaunchContext,
    ) -> Result<Self, LaunchFailure<Self>> {
        let endpoint = ServiceEndpoint::parse(&cfg.address, "").map_err(LaunchFailure::new)?;

        let spec = ctx
            .process_spec(Self::NAME, &cfg.program)
            .args(cfg.args.iter().cloned());
        let process = start(&spec).map_err(LaunchFailure::new)?;
        let service = Self { endpoint, process };

        if let Err(e) = ctx.wait_ready(&service.endpoint.address()).await {
            return Err(LaunchFailure::with_partial(e, service));
        }

        info!(service = Self::NAME, endpoint = %service.endpoint, "service ready");
        Ok(service)
    }

    pub fn process_mut(&mut self) -> &mut SupervisedProcess {
        &mut self.process
    }
}

#[async_trait]
impl ManagedService for SchedulerService {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    async fn shutdown(&mut self) -> Vec<TeardownCause> {
        stop_process(Self::NAME, &mut self.process).await.into_iter().collect()
    }
}

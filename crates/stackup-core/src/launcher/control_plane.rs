use std::time::Duration;

use async_trait::async_trait;
use stackup_exec::{SupervisedProcess, start};
use stackup_model::{AccountConfig, ControlPlaneConfig, Env, ServiceEndpoint};
use tracing::info;

use crate::{
    error::TeardownCause,
    launcher::{LaunchContext, LaunchFailure, ManagedService, bootstrap, stop_process},
};

/// Control plane: accepts deployments and talks to the scheduler and the registry.
///
/// Ready only once it accepts TCP connections *and* the bootstrap account
/// has been registered.
#[derive(Debug)]
pub struct ControlPlaneService {
    endpoint: ServiceEndpoint,
    process: SupervisedProcess,
}

impl ControlPlaneService {
    pub const NAME: &'static str = "control-plane";

    pub async fn launch(
        cfg: &ControlPlaneConfig,
        account: &AccountConfig,
        registry: &ServiceEndpoint,
        bootstrap_timeout: Duration,
        ctx: &LaunchContext,
    ) -> Result<Self, LaunchFailure<Self>> {
        let port = ctx.allocate_port().map_err(LaunchFailure::new)?;
        let endpoint = ServiceEndpoint::local(port, "");

        let spec = ctx
            .process_spec(Self::NAME, &cfg.program)
            .args(cfg.args.iter().cloned())
            .env(service_env(cfg, &endpoint, registry));
        let process = start(&spec).map_err(LaunchFailure::new)?;
        let service = Self { endpoint, process };

        if let Err(e) = ctx.wait_ready(&service.endpoint.address()).await {
            return Err(LaunchFailure::with_partial(e, service));
        }
        if let Err(e) =
            bootstrap::register_account(service.endpoint.base_url(), account, bootstrap_timeout)
                .await
        {
            return Err(LaunchFailure::with_partial(e, service));
        }

        info!(service = Self::NAME, endpoint = %service.endpoint, "service ready");
        Ok(service)
    }

    pub fn process_mut(&mut self) -> &mut SupervisedProcess {
        &mut self.process
    }
}

fn service_env(
    cfg: &ControlPlaneConfig,
    endpoint: &ServiceEndpoint,
    registry: &ServiceEndpoint,
) -> Env {
    Env::new()
        .with("ASPNETCORE_URLS", endpoint.base_url())
        .with("Nomad__Driver", &cfg.scheduler_driver)
        .with("Nomad__Datacenters__0", &cfg.datacenter)
        .with("Database__Driver", &cfg.database_driver)
        .with(
            "ConnectionStrings__Bindle",
            format!("Address={}", registry.base_url()),
        )
        .with("Jwt__Key", &cfg.jwt_key)
        .with("Jwt__Issuer", &cfg.jwt_issuer)
        .with("Jwt__Audience", &cfg.jwt_audience)
}

#[async_trait]
impl ManagedService for ControlPlaneService {
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

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use stackup_exec::SupervisedProcess;
use stackup_model::{AppMetadata, ENVIRONMENT_NAME, ServiceEndpoint, StackConfig};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    environment::{Cli, Environment, MetadataExtractor, sweep},
    error::{CoreError, TeardownError},
    launcher::{
        ArtifactRegistry, ControlPlaneService, LaunchContext, LaunchFailure, ManagedService,
        SchedulerService,
    },
    net::{EphemeralPorts, PortAllocator},
};

/// Scheduler, artifact registry and control plane running as local processes.
///
/// A value returned by [`LocalCloud::start`] has all three services reachable
/// and the bootstrap account registered. It must be torn down with
/// [`Environment::teardown`]; dropping it leaves the processes running.
#[derive(Debug)]
pub struct LocalCloud {
    config: StackConfig,
    ctx: LaunchContext,
    cli: Cli,
    scheduler: Option<SchedulerService>,
    registry: Option<ArtifactRegistry>,
    control_plane: Option<ControlPlaneService>,
}

impl LocalCloud {
    /// Launch the cluster on kernel-assigned ports.
    pub async fn start(config: StackConfig) -> Result<Self, StartupFailure> {
        Self::start_with(config, Arc::new(EphemeralPorts), CancellationToken::new()).await
    }

    /// Launch scheduler, registry and control plane, strictly in that order.
    ///
    /// On failure the returned [`StartupFailure`] owns whatever was started;
    /// tear it down before dropping it. Cancelling `cancel` aborts the
    /// readiness probe in progress.
    pub async fn start_with(
        config: StackConfig,
        ports: Arc<dyn PortAllocator>,
        cancel: CancellationToken,
    ) -> Result<Self, StartupFailure> {
        let ctx = LaunchContext::new(ports, config.readiness)
            .with_cancel(cancel)
            .with_stop_grace(config.stop_grace())
            .with_output_log(config.output);
        let cli = Cli::new(config.cli.clone())
            .with_stop_grace(config.stop_grace())
            .with_output_log(config.output);
        let mut cloud = Self {
            config,
            ctx,
            cli,
            scheduler: None,
            registry: None,
            control_plane: None,
        };

        match cloud.launch_all().await {
            Ok(()) => {
                info!(environment = ENVIRONMENT_NAME, "environment ready");
                Ok(cloud)
            }
            Err(e) => {
                error!(environment = ENVIRONMENT_NAME, error = %e, "environment startup failed");
                Err(StartupFailure {
                    error: e,
                    partial: Box::new(cloud),
                })
            }
        }
    }

    async fn launch_all(&mut self) -> Result<(), CoreError> {
        self.config.validate()?;

        let launched = SchedulerService::launch(&self.config.scheduler, &self.ctx).await;
        settle(&mut self.scheduler, launched)?;

        let launched = ArtifactRegistry::launch(&self.config.registry, &self.ctx).await;
        let registry = settle(&mut self.registry, launched)?;

        let launched = ControlPlaneService::launch(
            &self.config.control_plane,
            &self.config.account,
            &registry,
            self.config.bootstrap_timeout(),
            &self.ctx,
        )
        .await;
        settle(&mut self.control_plane, launched)?;
        Ok(())
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn cli(&self) -> &Cli {
        &self.cli
    }

    pub fn scheduler(&self) -> Option<&SchedulerService> {
        self.scheduler.as_ref()
    }

    pub fn scheduler_mut(&mut self) -> Option<&mut SchedulerService> {
        self.scheduler.as_mut()
    }

    pub fn registry(&self) -> Option<&ArtifactRegistry> {
        self.registry.as_ref()
    }

    pub fn registry_mut(&mut self) -> Option<&mut ArtifactRegistry> {
        self.registry.as_mut()
    }

    pub fn control_plane(&self) -> Option<&ControlPlaneService> {
        self.control_plane.as_ref()
    }

    pub fn control_plane_mut(&mut self) -> Option<&mut ControlPlaneService> {
        self.control_plane.as_mut()
    }

    fn endpoint_of<'a, S: ManagedService>(
        service: Option<&'a S>,
        name: &'static str,
    ) -> Result<&'a ServiceEndpoint, CoreError> {
        service
            .map(ManagedService::endpoint)
            .ok_or(CoreError::NotReady(name))
    }
}

/// Run `extractor` over the stdout captured so far until it succeeds.
///
/// Gives up with the last extraction error once the readiness timeout has
/// elapsed or the launch context is cancelled.
async fn extract_from_output(
    name: &str,
    app: &mut SupervisedProcess,
    extractor: &dyn MetadataExtractor,
    ctx: &LaunchContext,
) -> Result<AppMetadata, CoreError> {
    let policy = ctx.readiness();
    let cancel = ctx.cancel_token();
    let deadline = Instant::now() + policy.timeout();

    loop {
        let err = match extractor.extract(name, &app.stdout()) {
            Ok(meta) => return Ok(meta),
            Err(e) => e,
        };
        let now = Instant::now();
        if now >= deadline || cancel.is_cancelled() {
            return Err(err);
        }
        debug!(app = name, error = %err, "app metadata not available yet");

        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep_until(deadline.min(now + policy.interval())) => {}
        }
    }
}

/// Record a launch outcome in `slot`, keeping partial handles for teardown.
fn settle<S: ManagedService>(
    slot: &mut Option<S>,
    launched: Result<S, LaunchFailure<S>>,
) -> Result<ServiceEndpoint, CoreError> {
    match launched {
        Ok(service) => {
            let endpoint = service.endpoint().clone();
            *slot = Some(service);
            Ok(endpoint)
        }
        Err(failure) => {
            let (error, partial) = failure.into_parts();
            *slot = partial;
            Err(error)
        }
    }
}

#[async_trait]
impl Environment for LocalCloud {
    fn name(&self) -> &str {
        ENVIRONMENT_NAME
    }

    async fn login(&mut self) -> Result<(), CoreError> {
        let control_plane =
            Self::endpoint_of(self.control_plane.as_ref(), ControlPlaneService::NAME)?;
        let registry = Self::endpoint_of(self.registry.as_ref(), ArtifactRegistry::NAME)?;

        self.cli
            .login(control_plane, registry, &self.config.account)
            .await?;
        info!(control_plane = %control_plane, "cli logged in");
        Ok(())
    }

    async fn install_templates(&mut self, args: &[String]) -> Result<(), CoreError> {
        self.cli.install_templates(args).await?;
        Ok(())
    }

    async fn install_plugins(&mut self, plugins: &[String]) -> Result<(), CoreError> {
        self.cli.install_plugins(plugins).await
    }

    async fn new_app(&mut self, template: &str, name: &str) -> Result<(), CoreError> {
        self.cli.new_app(template, name).await?;
        info!(app = name, template, "app created");
        Ok(())
    }

    async fn build(&mut self, name: &str) -> Result<(), CoreError> {
        self.cli.build(name).await?;
        info!(app = name, "app built");
        Ok(())
    }

    /// Serve `name` on a fresh local port, wait until it accepts connections,
    /// then describe it from its captured stdout.
    ///
    /// The app may print its routes after binding, so extraction is retried on
    /// every readiness tick until it succeeds or the readiness timeout elapses.
    /// On success the serving process is left running and is not stopped by
    /// teardown; on failure it is stopped.
    async fn deploy(
        &mut self,
        name: &str,
        args: &[String],
        extractor: &dyn MetadataExtractor,
    ) -> Result<AppMetadata, CoreError> {
        let listen = ServiceEndpoint::local(self.ctx.allocate_port()?, "");
        let mut app = self.cli.serve(name, &listen.address(), args)?;

        let deployed = match self.ctx.wait_ready(&listen.address()).await {
            Ok(()) => {
                info!(app = name, listen = %listen, pid = ?app.pid(), "app serving");
                extract_from_output(name, &mut app, extractor, &self.ctx).await
            }
            Err(e) => Err(e),
        };

        if deployed.is_err() {
            if let Err(stop) = app.stop().await {
                warn!(app = name, error = %stop, "failed to stop app after failed deploy");
            }
        }
        deployed
    }

    async fn stop_app(&mut self, _name: &str) -> Result<(), CoreError> {
        Ok(())
    }

    async fn poll_for_latest_version(
        &mut self,
        _cancel: &CancellationToken,
        _metadata: &AppMetadata,
    ) -> Result<(), CoreError> {
        Ok(())
    }

    async fn teardown(&mut self) -> Result<(), TeardownError> {
        let services = [
            self.scheduler
                .as_mut()
                .map(|s| s as &mut dyn ManagedService),
            self.registry.as_mut().map(|s| s as &mut dyn ManagedService),
            self.control_plane
                .as_mut()
                .map(|s| s as &mut dyn ManagedService),
        ];
        sweep(services.into_iter().flatten()).await
    }
}

/// Startup error plus the partially started environment.
pub struct StartupFailure {
    error: CoreError,
    partial: Box<LocalCloud>,
}

impl StartupFailure {
    pub fn error(&self) -> &CoreError {
        &self.error
    }

    /// The environment as far as it got; still needs a teardown.
    pub fn partial_mut(&mut self) -> &mut LocalCloud {
        &mut self.partial
    }

    pub fn into_parts(self) -> (CoreError, LocalCloud) {
        (self.error, *self.partial)
    }
}

impl fmt::Debug for StartupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StartupFailure")
            .field("error", &self.error)
            .field("scheduler", &self.partial.scheduler.is_some())
            .field("registry", &self.partial.registry.is_some())
            .field("control_plane", &self.partial.control_plane.is_some())
            .finish()
    }
}

impl fmt::Display for StartupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "environment startup failed: {}", self.error)
    }
}

impl std::error::Error for StartupFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

use std::path::Path;

use async_trait::async_trait;
use stackup_exec::{SupervisedProcess, start};
use stackup_model::{RegistryConfig, ServiceEndpoint};
use tempfile::TempDir;
use tracing::info;

use crate::{
    error::{CoreError, TeardownCause},
    launcher::{LaunchContext, LaunchFailure, ManagedService, stop_process},
};

/// Artifact registry with its storage in a private temporary directory.
#[derive(Debug)]
pub struct ArtifactRegistry {
    endpoint: ServiceEndpoint,
    process: SupervisedProcess,
    /// Removed during shutdown; `None` once removed.
    cache_dir: Option<TempDir>,
}

impl ArtifactRegistry {
    pub const NAME: &'static str = "artifact-registry";

    /// Path under which the registry API is served.
    pub const API_PATH: &'static str = "/v1";

    pub async fn launch(
        cfg: &RegistryConfig,
        ctx: &LaunchContext,
    ) -> Result<Self, LaunchFailure<Self>> {
        let port = ctx.allocate_port().map_err(LaunchFailure::new)?;
        let endpoint = ServiceEndpoint::local(port, Self::API_PATH);

        let cache_dir = tempfile::Builder::new()
            .prefix(&cfg.cache_prefix)
            .tempdir()
            .map_err(|e| LaunchFailure::new(CoreError::Scratch(e)))?;

        let spec = ctx
            .process_spec(Self::NAME, &cfg.program)
            .args(cfg.args.iter().cloned())
            .arg("-d")
            .arg(cache_dir.path().display().to_string())
            .arg("-i")
            .arg(endpoint.address())
            .arg("--unauthenticated");
        let process = start(&spec).map_err(LaunchFailure::new)?;
        let service = Self {
            endpoint,
            process,
            cache_dir: Some(cache_dir),
        };

        if let Err(e) = ctx.wait_ready(&service.endpoint.address()).await {
            return Err(LaunchFailure::with_partial(e, service));
        }

        info!(service = Self::NAME, endpoint = %service.endpoint, "service ready");
        Ok(service)
    }

    /// Storage directory, until shutdown removes it.
    pub fn cache_dir(&self) -> Option<&Path> {
        self.cache_dir.as_ref().map(TempDir::path)
    }

    pub fn process_mut(&mut self) -> &mut SupervisedProcess {
        &mut self.process
    }
}

#[async_trait]
impl ManagedService for ArtifactRegistry {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    async fn shutdown(&mut self) -> Vec<TeardownCause> {
        let mut causes: Vec<TeardownCause> = stop_process(Self::NAME, &mut self.process)
            .await
            .into_iter()
            .collect();

        if let Some(dir) = self.cache_dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(source) = dir.close() {
                causes.push(TeardownCause::Cleanup {
                    service: Self::NAME,
                    path,
                    source,
                });
            }
        }
        causes
    }
}

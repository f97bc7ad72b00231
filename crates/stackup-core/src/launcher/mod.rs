//! Service launchers.
//!
//! Every launcher follows the same shape: pick an address, build the command
//! line, start the process in its own group, then block on the readiness
//! probe. A launcher whose process already started returns it inside the
//! [`LaunchFailure`] so that it can still be stopped.
mod bootstrap;
mod context;
mod control_plane;
mod registry;
mod scheduler;

pub use bootstrap::register_account;
pub use context::LaunchContext;
pub use control_plane::ControlPlaneService;
pub use registry::ArtifactRegistry;
pub use scheduler::SchedulerService;

use std::fmt;

use async_trait::async_trait;
use stackup_exec::SupervisedProcess;
use stackup_model::ServiceEndpoint;

use crate::error::{CoreError, TeardownCause};

/// A launched service owned by the environment controller.
#[async_trait]
pub trait ManagedService: Send + Sync {
    /// Short stable name used in logs and teardown reports.
    fn name(&self) -> &'static str;

    fn endpoint(&self) -> &ServiceEndpoint;

    /// Stop the process and release scratch resources.
    ///
    /// Every step is attempted; all failures are returned. Calling it again
    /// after a successful shutdown yields no causes.
    async fn shutdown(&mut self) -> Vec<TeardownCause>;
}

/// Stop `process`, reporting a failure as a teardown cause.
pub(crate) async fn stop_process(
    service: &'static str,
    process: &mut SupervisedProcess,
) -> Option<TeardownCause> {
    process
        .stop()
        .await
        .err()
        .map(|source| TeardownCause::Stop { service, source })
}

/// Error of a launch, plus the service handle if its process already started.
pub struct LaunchFailure<S> {
    error: CoreError,
    partial: Option<S>,
}

impl<S> LaunchFailure<S> {
    /// Failure before any process was started.
    pub fn new(error: impl Into<CoreError>) -> Self {
        Self {
            error: error.into(),
            partial: None,
        }
    }

    /// Failure after the process started; `service` must still be stopped.
    pub fn with_partial(error: impl Into<CoreError>, service: S) -> Self {
        Self {
            error: error.into(),
            partial: Some(service),
        }
    }

    pub fn into_parts(self) -> (CoreError, Option<S>) {
        (self.error, self.partial)
    }
}

impl<S> fmt::Debug for LaunchFailure<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchFailure")
            .field("error", &self.error)
            .field("has_partial", &self.partial.is_some())
            .finish()
    }
}

impl<S> fmt::Display for LaunchFailure<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl<S> std::error::Error for LaunchFailure<S> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

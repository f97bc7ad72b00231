use std::{fmt, sync::Arc, time::Duration};

use stackup_exec::ProcessSpec;
use stackup_model::{OutputLogConfig, ReadinessPolicy};
use tokio_util::sync::CancellationToken;

use crate::{
    error::CoreError,
    net::{EphemeralPorts, PortAllocator, wait_ready},
};

/// Collaborators and policies shared by every launch.
#[derive(Clone)]
pub struct LaunchContext {
    ports: Arc<dyn PortAllocator>,
    readiness: ReadinessPolicy,
    cancel: CancellationToken,
    stop_grace: Duration,
    output: OutputLogConfig,
}

impl LaunchContext {
    pub fn new(ports: Arc<dyn PortAllocator>, readiness: ReadinessPolicy) -> Self {
        Self {
            ports,
            readiness,
            cancel: CancellationToken::new(),
            stop_grace: ProcessSpec::DEFAULT_STOP_GRACE,
            output: OutputLogConfig::default(),
        }
    }

    /// Cancelling `cancel` aborts any readiness probe in progress.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    pub fn with_output_log(mut self, output: OutputLogConfig) -> Self {
        self.output = output;
        self
    }

    pub fn readiness(&self) -> &ReadinessPolicy {
        &self.readiness
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn allocate_port(&self) -> Result<u16, CoreError> {
        self.ports.allocate()
    }

    pub async fn wait_ready(&self, address: &str) -> Result<(), CoreError> {
        wait_ready(address, &self.readiness, &self.cancel).await?;
        Ok(())
    }

    /// Base process spec carrying the shared stop grace and output logging.
    pub fn process_spec(&self, name: &str, program: &str) -> ProcessSpec {
        ProcessSpec::new(name, program)
            .stop_grace(self.stop_grace)
            .log(self.output)
    }
}

impl Default for LaunchContext {
    fn default() -> Self {
        Self::new(Arc::new(EphemeralPorts), ReadinessPolicy::default())
    }
}

impl fmt::Debug for LaunchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LaunchContext")
            .field("readiness", &self.readiness)
            .field("stop_grace", &self.stop_grace)
            .field("canceled", &self.cancel.is_cancelled())
            .finish()
    }
}

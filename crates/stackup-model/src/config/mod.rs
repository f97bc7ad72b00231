//! Configuration of a local stack.
//!
//! Every struct deserializes from camelCase JSON and falls back to defaults
//! for missing fields, so an empty object is a valid configuration.
mod output;
pub use output::OutputLogConfig;

mod readiness;
pub use readiness::ReadinessPolicy;

mod service;
pub use service::{AccountConfig, CliConfig, ControlPlaneConfig, RegistryConfig, SchedulerConfig};

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{ModelError, ServiceEndpoint, TimeoutMs};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StackConfig {
    pub scheduler: SchedulerConfig,
    pub registry: RegistryConfig,
    pub control_plane: ControlPlaneConfig,
    pub account: AccountConfig,
    pub cli: CliConfig,
    pub readiness: ReadinessPolicy,
    /// Log mirroring of every captured service and CLI stream.
    pub output: OutputLogConfig,
    /// Client timeout of the account bootstrap call.
    pub bootstrap_timeout_ms: TimeoutMs,
    /// How long a stopped process group may take to exit before it is killed.
    pub stop_grace_ms: TimeoutMs,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            registry: RegistryConfig::default(),
            control_plane: ControlPlaneConfig::default(),
            account: AccountConfig::default(),
            cli: CliConfig::default(),
            readiness: ReadinessPolicy::default(),
            output: OutputLogConfig::default(),
            bootstrap_timeout_ms: 5_000,
            stop_grace_ms: 10_000,
        }
    }
}

impl StackConfig {
    /// Load and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: display.clone(),
            source,
        })?;
        let cfg: Self = serde_json::from_str(&raw).map_err(|source| ModelError::Parse {
            path: display,
            source,
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        service::require_program("scheduler.program", &self.scheduler.program)?;
        service::require_program("registry.program", &self.registry.program)?;
        service::require_program("controlPlane.program", &self.control_plane.program)?;
        service::require_program("cli.program", &self.cli.program)?;
        ServiceEndpoint::parse(&self.scheduler.address, "")?;
        self.readiness.validate()?;
        self.output.validate()?;

        if self.bootstrap_timeout_ms == 0 {
            return Err(ModelError::Invalid("bootstrapTimeoutMs cannot be zero".into()));
        }
        if self.stop_grace_ms == 0 {
            return Err(ModelError::Invalid("stopGraceMs cannot be zero".into()));
        }
        Ok(())
    }

    pub fn bootstrap_timeout(&self) -> Duration {
        Duration::from_millis(self.bootstrap_timeout_ms)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }
}

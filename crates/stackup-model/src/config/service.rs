use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{LOCALHOST, ModelError};

/// Scheduler agent launched in dev mode at a fixed address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulerConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Well-known `host:port` downstream services expect the scheduler on.
    pub address: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            program: "nomad".into(),
            args: vec!["agent".into(), "-dev".into()],
            address: format!("{LOCALHOST}:4646"),
        }
    }
}

/// Artifact registry backed by a private scratch directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistryConfig {
    pub program: String,
    /// Placed before the storage and bind flags.
    pub args: Vec<String>,
    /// Prefix of the temporary cache directory name.
    pub cache_prefix: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            program: "bindle-server".into(),
            args: Vec::new(),
            cache_prefix: "registry-cache-".into(),
        }
    }
}

/// Control-plane service and the secrets it issues tokens with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControlPlaneConfig {
    pub program: String,
    pub args: Vec<String>,
    pub scheduler_driver: String,
    pub datacenter: String,
    pub database_driver: String,
    pub jwt_key: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            program: "Hippo.Web".into(),
            args: Vec::new(),
            scheduler_driver: "raw_exec".into(),
            datacenter: "dc1".into(),
            database_driver: "inmemory".into(),
            jwt_key: "ceci n'est pas une jeton".into(),
            jwt_issuer: "localhost".into(),
            jwt_audience: "localhost".into(),
        }
    }
}

/// Account registered on the control plane during bootstrap and used by `login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountConfig {
    pub username: String,
    pub password: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            username: "e2e".into(),
            password: "password".into(),
        }
    }
}

/// Deployment CLI under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CliConfig {
    pub program: String,
    /// Arguments placed before every subcommand.
    pub base_args: Vec<String>,
    /// Directory applications are created in; each app lives in `<apps_dir>/<name>`.
    pub apps_dir: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            program: "spin".into(),
            base_args: Vec::new(),
            apps_dir: PathBuf::from("."),
        }
    }
}

pub(crate) fn require_program(field: &str, program: &str) -> Result<(), ModelError> {
    if program.trim().is_empty() {
        return Err(ModelError::Invalid(format!("{field} cannot be empty")));
    }
    Ok(())
}

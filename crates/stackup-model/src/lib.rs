mod domain;
pub use domain::{ENVIRONMENT_NAME, LOCALHOST};
pub use domain::{Env, KeyValue, ServiceEndpoint, TimeoutMs};

mod error;
pub use error::{ModelError, ModelResult};

mod metadata;
pub use metadata::{AppMetadata, AppRoute};

mod config;
pub use config::{
    AccountConfig, CliConfig, ControlPlaneConfig, OutputLogConfig, ReadinessPolicy, RegistryConfig,
    SchedulerConfig, StackConfig,
};

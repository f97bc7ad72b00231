//! Orchestration of a local cluster for end-to-end tests of a deployment CLI.
//!
//! The cluster is a scheduler, an artifact registry and a control plane,
//! launched in that order and torn down together by [`LocalCloud`].
pub mod error;
pub mod net;
pub mod launcher;
pub mod environment;

pub use environment::{Cli, Environment, LocalCloud, MetadataExtractor, StartupFailure};
pub use error::{CoreError, TeardownCause, TeardownError};
pub use launcher::{
    ArtifactRegistry, ControlPlaneService, LaunchContext, LaunchFailure, ManagedService,
    SchedulerService,
};
pub use net::{EphemeralPorts, PortAllocator, ProbeError, TimeoutCause, wait_ready};

pub mod prelude {
    pub use crate::environment::{Environment, LocalCloud, MetadataExtractor};
    pub use crate::error::{CoreError, TeardownError};
    pub use crate::net::{PortAllocator, ProbeError};
    pub use stackup_model::{AppMetadata, StackConfig};
}

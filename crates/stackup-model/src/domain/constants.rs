//! Common model-level constants.

/// Loopback host every locally launched service binds to.
pub const LOCALHOST: &str = "127.0.0.1";

/// Name reported by the local-cloud environment flavor.
pub const ENVIRONMENT_NAME: &str = "using-local-cloud";

mod kv;
pub use kv::KeyValue;

mod env;
pub use env::Env;

mod endpoint;
pub use endpoint::ServiceEndpoint;

mod constants;
pub use constants::{ENVIRONMENT_NAME, LOCALHOST};

/// Timeout value in milliseconds.
///
/// Used in configuration wherever a bounded wait is required.
pub type TimeoutMs = u64;

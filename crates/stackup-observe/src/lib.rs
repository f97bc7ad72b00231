//! Logging setup shared by the stackup binaries and test harnesses.
mod logger;
pub use logger::*;

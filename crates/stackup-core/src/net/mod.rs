mod ports;
pub use ports::{EphemeralPorts, PortAllocator};

mod probe;
pub use probe::{ProbeError, TimeoutCause, wait_ready};

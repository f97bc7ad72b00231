use std::net::TcpListener;

use stackup_model::LOCALHOST;

use crate::CoreError;

/// Source of local TCP ports for dynamically addressed services.
///
/// Best effort: a port is free when handed out, but nothing reserves it
/// until the service binds it.
pub trait PortAllocator: Send + Sync {
    fn allocate(&self) -> Result<u16, CoreError>;
}

/// Lets the kernel pick a port from the ephemeral range.
#[derive(Debug, Default, Clone, Copy)]
pub struct EphemeralPorts;

impl PortAllocator for EphemeralPorts {
    fn allocate(&self) -> Result<u16, CoreError> {
        let listener = TcpListener::bind((LOCALHOST, 0)).map_err(CoreError::Allocation)?;
        let port = listener.local_addr().map_err(CoreError::Allocation)?.port();
        Ok(port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocated_port_can_be_bound() {
        let port = EphemeralPorts.allocate().unwrap();
        assert_ne!(port, 0);
        TcpListener::bind((LOCALHOST, port)).expect("allocated port should be free");
    }
}

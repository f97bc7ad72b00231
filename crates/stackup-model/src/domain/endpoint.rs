use std::fmt;

use crate::{LOCALHOST, ModelError};

/// Network identity of a launched service.
///
/// Computed once when the service is launched and never mutated afterwards.
/// Sibling services receive clones when they need to address it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    host: String,
    port: u16,
    base_url: String,
}

impl ServiceEndpoint {
    /// Endpoint on the loopback interface whose base URL is `http://127.0.0.1:<port><path>`.
    pub fn local(port: u16, path: &str) -> Self {
        Self::new(LOCALHOST, port, path)
    }

    pub fn new(host: impl Into<String>, port: u16, path: &str) -> Self {
        let host = host.into();
        let base_url = format!("http://{host}:{port}{path}");
        Self {
            host,
            port,
            base_url,
        }
    }

    /// Parse a `host:port` pair.
    pub fn parse(address: &str, path: &str) -> Result<Self, ModelError> {
        let (host, port) = address
            .rsplit_once(':')
            .ok_or_else(|| ModelError::InvalidAddress(address.to_string()))?;
        if host.is_empty() {
            return Err(ModelError::InvalidAddress(address.to_string()));
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| ModelError::InvalidAddress(address.to_string()))?;
        Ok(Self::new(host, port, path))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port`, suitable for a TCP connect or a `--listen` flag.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Externally advertised base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url)
    }
}

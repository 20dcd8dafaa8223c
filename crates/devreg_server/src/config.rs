//! Server configuration.

use crate::error::{ServerError, ServerResult};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Default read/write timeout for a single request.
pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Default time in-flight requests get to finish after shutdown starts.
pub(crate) const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(60);

/// Default maximum request body size (64 KiB).
pub(crate) const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024;

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Request timeout. Requests running longer receive 408.
    pub request_timeout: Duration,
    /// How long in-flight requests may run after shutdown is requested.
    pub shutdown_timeout: Duration,
    /// Maximum accepted request body size in bytes.
    pub max_body_size: usize,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Sets the bind address from a textual IP address and a port.
    ///
    /// An empty `address` binds every interface. Host names are not
    /// resolved; `address` must be an IPv4 or IPv6 literal.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::InvalidConfig`] if the address is not an IP
    /// literal or the port is above 65535.
    pub fn with_bind_address(mut self, address: &str, port: u32) -> ServerResult<Self> {
        let ip = if address.is_empty() {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            address.parse::<IpAddr>().map_err(|_| {
                ServerError::InvalidConfig(format!(
                    "failed to parse '{address}' as an IP address"
                ))
            })?
        };

        let port = u16::try_from(port).map_err(|_| {
            ServerError::InvalidConfig(format!(
                "invalid TCP port passed, '{port}'. port must be between 0 and 65535"
            ))
        })?;

        self.bind_addr = SocketAddr::new(ip, port);
        Ok(self)
    }

    /// Sets the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the graceful shutdown timeout.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Sets the maximum request body size.
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([0, 0, 0, 0], 8000)))
    }
}

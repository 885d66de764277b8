//! Relay configuration

use std::net::SocketAddr;

use crate::error::RelayError;

/// Default bind address (the relay's well-known port)
pub const DEFAULT_ADDR: &str = "0.0.0.0:8008";

/// Default server name, logged at startup
pub const DEFAULT_SERVER_NAME: &str = "Fluffy Succotash";

/// Default shared secret checked during the handshake
pub const DEFAULT_PASSPHRASE: &str = "heisenberg";

/// Relay configuration
///
/// Use the builder methods to customize the defaults.
///
/// # Example
///
/// ```
/// use chat_relay::RelayConfig;
///
/// let config = RelayConfig::default()
///     .with_server_name("Los Pollos")
///     .with_outbound_capacity(16);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Address to bind the listener to
    pub bind_address: SocketAddr,

    /// Name of this relay instance
    pub server_name: String,

    /// Shared secret a client must send before naming itself
    pub passphrase: String,

    /// Capacity of the relay's single inbound channel
    pub inbound_capacity: usize,

    /// Capacity of each session's outbound mailbox
    ///
    /// When a session falls this far behind, its oldest pending lines are dropped.
    pub outbound_capacity: usize,

    /// Longest accepted line in bytes, excluding the terminator
    pub max_line_length: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8008)),
            server_name: DEFAULT_SERVER_NAME.to_string(),
            passphrase: DEFAULT_PASSPHRASE.to_string(),
            inbound_capacity: 256,
            outbound_capacity: 64,
            max_line_length: 8192,
        }
    }
}

impl RelayConfig {
    /// Create a new configuration with the given bind address
    pub fn new(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            ..Default::default()
        }
    }

    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = passphrase.into();
        self
    }

    pub fn with_inbound_capacity(mut self, capacity: usize) -> Self {
        self.inbound_capacity = capacity;
        self
    }

    pub fn with_outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity;
        self
    }

    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.inbound_capacity == 0 {
            return Err(RelayError::InvalidConfig(
                "inbound_capacity must be greater than 0".to_string(),
            ));
        }

        if self.outbound_capacity == 0 {
            return Err(RelayError::InvalidConfig(
                "outbound_capacity must be greater than 0".to_string(),
            ));
        }

        if self.max_line_length == 0 {
            return Err(RelayError::InvalidConfig(
                "max_line_length must be greater than 0".to_string(),
            ));
        }

        if self.passphrase.trim().is_empty() {
            return Err(RelayError::InvalidConfig(
                "passphrase must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

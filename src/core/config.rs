use std::time::Duration;

use serde::{Serialize, Deserialize};

use super::error::{Error, Result};
use super::types::{Credentials, ProtocolVersion};
use super::{DEFAULT_PORT, DEFAULT_TIMEOUT};

/// Factory default controller id
pub const DEFAULT_DEVICE_ID: &str = "DEFAULT_DEVICEID";

/// Factory default controller password
pub const DEFAULT_PASSWORD: &str = "1111";

impl Default for Credentials {
    fn default() -> Self {
        Credentials::new(DEFAULT_DEVICE_ID, DEFAULT_PASSWORD)
    }
}

/// Connection settings for one controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Controller host name or IP address
    pub host: String,
    /// Controller UDP port
    pub port: u16,
    /// Id and password sent with every V2 packet
    #[serde(flatten)]
    pub credentials: Credentials,
    /// How long to wait for a response datagram
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub timeout: Duration,
    /// Wire protocol spoken by the controller
    pub version: ProtocolVersion,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            host: String::new(),
            port: DEFAULT_PORT,
            credentials: Credentials::default(),
            timeout: DEFAULT_TIMEOUT,
            version: ProtocolVersion::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for `host` with defaults for everything else
    pub fn new(host: impl Into<String>) -> Self {
        ClientConfig {
            host: host.into(),
            ..Default::default()
        }
    }

    /// Sets a custom controller port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the device id and password
    pub fn with_credentials(mut self, device_id: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Credentials::new(device_id, password);
        self
    }

    /// Sets the receive timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Selects the wire protocol
    pub fn with_version(mut self, version: ProtocolVersion) -> Self {
        self.version = version;
        self
    }

    /// Checks that the configuration can be used to reach a controller
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::config("host must not be empty"));
        }
        if self.port == 0 {
            return Err(Error::config("port must not be 0"));
        }
        if self.timeout.is_zero() {
            return Err(Error::config("timeout must be greater than zero"));
        }
        Ok(())
    }
}

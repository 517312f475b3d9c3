//! The `[server]` section.

use std::time::Duration;

use resourceful_server::{
    ServerConfig, DEFAULT_HTTP_ADDR, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};

/// Listener settings as they appear in configuration files.
///
/// ```
/// use resourceful_config::ServerSection;
///
/// let section: ServerSection = toml::from_str(r#"http_addr = "127.0.0.1:3000""#).unwrap();
/// let config = section.to_server_config();
///
/// assert_eq!(config.http_addr(), "127.0.0.1:3000");
/// assert!(config.keep_alive());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    /// Bind address.
    pub http_addr: String,

    /// Grace period for open connections at shutdown, in seconds.
    pub shutdown_timeout_secs: u64,

    /// Upper bound on one request, in milliseconds.
    pub request_timeout_ms: u64,

    /// HTTP/1.1 keep-alive.
    pub keep_alive: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_SECS * 1000,
            keep_alive: true,
        }
    }
}

impl ServerSection {
    /// Converts to the server's runtime configuration.
    #[must_use]
    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig::builder()
            .http_addr(self.http_addr.clone())
            .shutdown_timeout(Duration::from_secs(self.shutdown_timeout_secs))
            .request_timeout(Duration::from_millis(self.request_timeout_ms))
            .keep_alive(self.keep_alive)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_server_defaults() {
        let config = ServerSection::default().to_server_config();
        let defaults = ServerConfig::default();
        assert_eq!(config.http_addr(), defaults.http_addr());
        assert_eq!(config.request_timeout(), defaults.request_timeout());
        assert_eq!(config.shutdown_timeout(), defaults.shutdown_timeout());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = toml::from_str::<ServerSection>("http2_enabled = true").unwrap_err();
        assert!(err.to_string().contains("http2_enabled"));
    }
}

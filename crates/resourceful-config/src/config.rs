//! The root configuration.

use resourceful_server::ConnectOptions;
use resourceful_telemetry::logging::create_env_filter;
use resourceful_telemetry::{LogConfig, MetricsConfig};
use serde::{Deserialize, Serialize};

use crate::schema::ServerSection;
use crate::ConfigError;

/// Everything a Resourceful application reads from configuration.
///
/// ```toml
/// [server]
/// http_addr = "0.0.0.0:8080"
/// request_timeout_ms = 30000
///
/// [connection]
/// secret = "change me"
/// debug = false
///
/// [logging]
/// level = "info"
/// json = true
///
/// [metrics]
/// enabled = true
/// addr = "0.0.0.0:9090"
/// ```
///
/// Every section is optional and unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourcefulConfig {
    /// HTTP listener.
    pub server: ServerSection,

    /// Options handed to `App::connect`.
    pub connection: ConnectOptions,

    /// Log output.
    pub logging: LogConfig,

    /// Prometheus exporter.
    pub metrics: MetricsConfig,
}

impl ResourcefulConfig {
    /// Local development: pretty `debug` logs and error details in responses.
    #[must_use]
    pub fn development() -> Self {
        Self {
            server: ServerSection {
                http_addr: "127.0.0.1:8080".to_string(),
                ..ServerSection::default()
            },
            connection: ConnectOptions::default().debug(true),
            logging: LogConfig::development(),
            metrics: MetricsConfig::default(),
        }
    }

    /// Production: JSON `info` logs and the metrics exporter on.
    #[must_use]
    pub fn production() -> Self {
        Self {
            server: ServerSection::default(),
            connection: ConnectOptions::default(),
            logging: LogConfig::production(),
            metrics: MetricsConfig {
                enabled: true,
                ..MetricsConfig::default()
            },
        }
    }

    /// Checks values serde cannot: addresses, timeouts, the secret and the
    /// log filter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }
        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.connection.secret.is_empty() {
            return Err(ConfigError::invalid_value(
                "connection.secret",
                "must not be empty",
            ));
        }
        if self.connection.token.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "connection.token",
                "must not be empty",
            ));
        }
        if self.connection.max_body_size == 0 {
            return Err(ConfigError::invalid_value(
                "connection.max_body_size",
                "must be greater than zero",
            ));
        }
        if self.logging.enabled {
            create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }
        if self.metrics.enabled {
            self.metrics
                .socket_addr()
                .map_err(|e| ConfigError::invalid_value("metrics.addr", e.to_string()))?;
        }
        Ok(())
    }
}

//! Request metrics.
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `resourceful_requests_total` | Counter | `endpoint`, `status` |
//! | `resourceful_request_duration_seconds` | Histogram | `endpoint` |
//! | `resourceful_in_flight_requests` | Gauge | - |
//!
//! Recording goes through the `metrics` facade and is a no-op until a
//! recorder is installed with [`init_metrics`].

use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::{Deserialize, Serialize};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Requests handled, by endpoint and status code.
pub const REQUESTS_TOTAL: &str = "resourceful_requests_total";
/// Request latency.
pub const REQUEST_DURATION_SECONDS: &str = "resourceful_request_duration_seconds";
/// Requests currently being handled.
pub const IN_FLIGHT_REQUESTS: &str = "resourceful_in_flight_requests";

/// Label used for requests that matched no route.
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    /// Whether the Prometheus exporter is installed.
    pub enabled: bool,

    /// Listen address of the exporter's scrape endpoint.
    pub addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: "0.0.0.0:9090".to_string(),
        }
    }
}

impl MetricsConfig {
    /// Parses the exporter address.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::InvalidAddress`] if `addr` is not a socket
    /// address.
    pub fn socket_addr(&self) -> TelemetryResult<SocketAddr> {
        self.addr
            .parse()
            .map_err(|e| TelemetryError::InvalidAddress(format!("{}: {e}", self.addr)))
    }
}

/// Installs the Prometheus recorder and its scrape listener.
///
/// Does nothing when `config.enabled` is off.
///
/// # Errors
///
/// Returns an error if the address is invalid or a recorder is already
/// installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let addr = config.socket_addr()?;
    let handle = PrometheusBuilder::new()
        .with_http_listener(addr)
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    let _ = METRICS_HANDLE.set(handle);

    describe_counter!(REQUESTS_TOTAL, "Total number of requests handled");
    describe_histogram!(REQUEST_DURATION_SECONDS, "Request duration in seconds");
    describe_gauge!(IN_FLIGHT_REQUESTS, "Requests currently being handled");

    tracing::info!(%addr, "prometheus exporter listening");
    Ok(())
}

/// Renders the Prometheus text exposition, if the recorder is installed.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

/// Records one handled request.
///
/// `endpoint` is `"<resource>.<endpoint id>"` for routed requests and
/// [`UNMATCHED_ENDPOINT`] otherwise.
pub fn record_request(endpoint: &str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "endpoint" => endpoint.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(REQUEST_DURATION_SECONDS, "endpoint" => endpoint.to_string())
        .record(duration.as_secs_f64());
}

/// Keeps the in-flight gauge raised for as long as it lives.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Increments the gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT_REQUESTS).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT_REQUESTS).decrement(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_disabled() {
        let config = MetricsConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.socket_addr().unwrap().port(), 9090);
    }

    #[test]
    fn test_invalid_address() {
        let config = MetricsConfig {
            enabled: true,
            addr: "not-an-address".to_string(),
        };
        assert!(matches!(
            init_metrics(&config),
            Err(TelemetryError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_disabled_metrics_install_nothing() {
        assert!(init_metrics(&MetricsConfig::default()).is_ok());
    }

    #[test]
    fn test_recording_without_recorder() {
        record_request("Post.find", 200, Duration::from_millis(12));
        record_request(UNMATCHED_ENDPOINT, 404, Duration::from_millis(1));
        let guard = InFlightGuard::new();
        drop(guard);
    }
}

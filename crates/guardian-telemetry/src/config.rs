//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name for logs and the build-info metric
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Whether to register Prometheus metrics
    pub metrics_enabled: bool,

    /// Network identifier (mainnet, holesky, ...)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "deposit-guardian".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: true,
            network: "mainnet".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `GUARDIAN_SERVICE_NAME`: Service name (default: deposit-guardian)
    /// - `GUARDIAN_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `GUARDIAN_LOG_JSON`: Enable JSON logs (default: false in dev, true in containers)
    /// - `GUARDIAN_METRICS_ENABLED`: Register Prometheus metrics (default: true)
    /// - `GUARDIAN_NETWORK`: Network name (default: mainnet)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("GUARDIAN_SERVICE_NAME")
                .unwrap_or_else(|_| "deposit-guardian".to_string()),

            log_level: env::var("GUARDIAN_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("GUARDIAN_LOG_JSON")
                .map(|v| parse_flag(&v))
                .unwrap_or(is_container),

            metrics_enabled: env::var("GUARDIAN_METRICS_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),

            network: env::var("GUARDIAN_NETWORK").unwrap_or_else(|_| "mainnet".to_string()),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

//! # Guardian Telemetry
//!
//! Logging and metrics for the deposit guardian.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with env filtering and JSON or pretty output
//! - **Metrics**: Prometheus counters, gauges and histograms in a global registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use guardian_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = TelemetryConfig::from_env();
//!     init_telemetry(&config)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GUARDIAN_SERVICE_NAME` | `deposit-guardian` | Service name |
//! | `GUARDIAN_LOG_LEVEL` | `info` | Log level filter |
//! | `GUARDIAN_LOG_JSON` | `false` | JSON log output |
//! | `GUARDIAN_METRICS_ENABLED` | `true` | Register Prometheus metrics |
//! | `GUARDIAN_NETWORK` | `mainnet` | Network name |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, BUILD_INFO, CYCLES, CYCLE_DURATION,
    DUPLICATED_KEYS, GUARD_ACTIONS, INCONSISTENT_READS, INTERSECTIONS, INVALID_KEYS,
    KEY_VALIDATION_DURATION, LAST_PROCESSED_BLOCK, MESSAGES_SENT, READ_ERRORS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and, when enabled, the metrics registry.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_logging(config)?;

    if config.metrics_enabled {
        register_metrics()?;
        BUILD_INFO
            .with_label_values(&[
                &config.service_name,
                env!("CARGO_PKG_VERSION"),
                &config.network,
            ])
            .set(1.0);
    }

    tracing::info!(
        service = %config.service_name,
        network = %config.network,
        metrics = config.metrics_enabled,
        "Telemetry initialized"
    );

    Ok(())
}

//! Structured logging setup.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either
//! JSON output (containers) or human-readable output (development). Every
//! guardian log line carries structured fields such as `block_number`,
//! `module_id` and `pubkey` so aborted cycles and pause decisions can be
//! audited from logs alone.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    tracing::debug!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Structured logging initialized"
    );

    Ok(())
}

/// Log a block-scoped guardian event with standard fields.
#[macro_export]
macro_rules! log_block_event {
    ($level:ident, $msg:expr, $block_number:expr, $block_hash:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            block_number = $block_number,
            block_hash = %$block_hash,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a module-scoped guardian event with standard fields.
#[macro_export]
macro_rules! log_module_event {
    ($level:ident, $msg:expr, $module_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            module_id = $module_id,
            $($($field)*,)?
            $msg
        )
    };
}

//! Prometheus metrics for the deposit guardian.
//!
//! All metrics follow the naming convention: `guardian_<area>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., cycles_total)
//! - **Gauge**: Value that can go up or down (e.g., invalid_keys)
//! - **Histogram**: Distribution of values (e.g., cycle_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, GaugeVec, Histogram, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // CYCLE METRICS
    // =========================================================================

    /// Guardian cycles by outcome
    pub static ref CYCLES: CounterVec = CounterVec::new(
        Opts::new("guardian_cycles_total", "Guardian cycles by outcome"),
        &["outcome"]  // outcome: completed/partial/unchanged_block/stale_block/already_running/failed
    ).expect("metric creation failed");

    /// Cycle duration histogram
    pub static ref CYCLE_DURATION: Histogram = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "guardian_cycle_duration_seconds",
            "Time spent in one guardian cycle"
        ).buckets(exponential_buckets(0.01, 2.0, 14).unwrap())
    ).expect("metric creation failed");

    /// Last block a cycle completed at
    pub static ref LAST_PROCESSED_BLOCK: Gauge = Gauge::new(
        "guardian_last_processed_block",
        "Block number of the last completed cycle"
    ).expect("metric creation failed");

    // =========================================================================
    // SNAPSHOT METRICS
    // =========================================================================

    /// Failed external reads by source
    pub static ref READ_ERRORS: CounterVec = CounterVec::new(
        Opts::new("guardian_read_errors_total", "Failed or timed out external reads"),
        &["source"]
    ).expect("metric creation failed");

    /// Registry reads rejected for a freshness token mismatch
    pub static ref INCONSISTENT_READS: Counter = Counter::new(
        "guardian_inconsistent_reads_total",
        "Registry reads rejected because the freshness token changed"
    ).expect("metric creation failed");

    // =========================================================================
    // KEY METRICS
    // =========================================================================

    /// Key validation duration
    pub static ref KEY_VALIDATION_DURATION: Histogram = Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "guardian_key_validation_duration_seconds",
            "Time spent validating deposit signatures for one module"
        ).buckets(exponential_buckets(0.001, 2.0, 15).unwrap())
    ).expect("metric creation failed");

    /// Invalid keys per module
    pub static ref INVALID_KEYS: GaugeVec = GaugeVec::new(
        Opts::new("guardian_invalid_keys", "Vetted unused keys with an invalid deposit signature"),
        &["module_id"]
    ).expect("metric creation failed");

    /// Deposit history intersections per module
    pub static ref INTERSECTIONS: GaugeVec = GaugeVec::new(
        Opts::new("guardian_deposit_intersections", "Vetted unused keys seen in deposit history"),
        &["module_id", "kind"]  // kind: benign/front_run
    ).expect("metric creation failed");

    /// Duplicated keys per module
    pub static ref DUPLICATED_KEYS: GaugeVec = GaugeVec::new(
        Opts::new("guardian_duplicated_keys", "Duplicated vetted unused keys"),
        &["module_id", "kind"]  // kind: resolved/unresolved
    ).expect("metric creation failed");

    // =========================================================================
    // ACTION METRICS
    // =========================================================================

    /// Guard decisions per module
    pub static ref GUARD_ACTIONS: CounterVec = CounterVec::new(
        Opts::new("guardian_actions_total", "Guard decisions by module"),
        &["module_id", "action"]  // action: already_paused/pause/unvet/deposit/unchanged
    ).expect("metric creation failed");

    /// Messages published by kind
    pub static ref MESSAGES_SENT: CounterVec = CounterVec::new(
        Opts::new("guardian_messages_sent_total", "Messages published to the bus"),
        &["kind"]
    ).expect("metric creation failed");

    /// Build information
    pub static ref BUILD_INFO: GaugeVec = GaugeVec::new(
        Opts::new("guardian_build_info", "Build information"),
        &["service", "version", "network"]
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Cycle
        Box::new(CYCLES.clone()),
        Box::new(CYCLE_DURATION.clone()),
        Box::new(LAST_PROCESSED_BLOCK.clone()),
        // Snapshot
        Box::new(READ_ERRORS.clone()),
        Box::new(INCONSISTENT_READS.clone()),
        // Keys
        Box::new(KEY_VALIDATION_DURATION.clone()),
        Box::new(INVALID_KEYS.clone()),
        Box::new(INTERSECTIONS.clone()),
        Box::new(DUPLICATED_KEYS.clone()),
        // Actions
        Box::new(GUARD_ACTIONS.clone()),
        Box::new(MESSAGES_SENT.clone()),
        Box::new(BUILD_INFO.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}

//! Prometheus metrics for broadcast orchestration.

use once_cell::sync::Lazy;
use prometheus::core::Collector;
use prometheus::{IntCounter, IntGauge};

/// Total broadcasts started successfully.
pub static BROADCASTS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "restreamd_broadcasts_started_total",
        "Total number of broadcasts started",
    )
    .unwrap()
});

/// Total broadcast launches that failed.
pub static BROADCAST_START_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "restreamd_broadcast_start_failures_total",
        "Total number of broadcast launches that failed",
    )
    .unwrap()
});

/// Total broadcasts stopped.
pub static BROADCASTS_STOPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "restreamd_broadcasts_stopped_total",
        "Total number of broadcasts stopped",
    )
    .unwrap()
});

/// Total broadcasts whose relay process could not be killed cleanly.
pub static BROADCAST_STOP_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "restreamd_broadcast_stop_failures_total",
        "Total number of broadcasts that did not stop cleanly",
    )
    .unwrap()
});

/// Number of broadcasts currently running.
pub static ACTIVE_BROADCASTS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "restreamd_active_broadcasts",
        "Number of broadcasts currently running",
    )
    .unwrap()
});

/// All collectors defined by this crate, for registry registration.
pub fn all_metrics() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(BROADCASTS_STARTED.clone()),
        Box::new(BROADCAST_START_FAILURES.clone()),
        Box::new(BROADCASTS_STOPPED.clone()),
        Box::new(BROADCAST_STOP_FAILURES.clone()),
        Box::new(ACTIVE_BROADCASTS.clone()),
    ]
}

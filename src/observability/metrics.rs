//! Metrics collection.
//!
//! # Metrics
//! - `extrinsic_watch_submissions_total` (counter): finished watches by outcome
//! - `extrinsic_watch_status_events_total` (counter): status updates by status
//! - `extrinsic_watch_duration_seconds` (histogram): broadcast to terminal status
//!
//! # Design Decisions
//! - Facade only: without an installed recorder every call is a no-op
//! - Labels are static strings, never transaction data

use std::time::Duration;

/// Record one finished watch.
pub fn record_outcome(outcome: &'static str, elapsed: Duration) {
    ::metrics::counter!("extrinsic_watch_submissions_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("extrinsic_watch_duration_seconds", "outcome" => outcome)
        .record(elapsed.as_secs_f64());
}

/// Record one status update received from the node.
pub fn record_status(status: &'static str) {
    ::metrics::counter!("extrinsic_watch_status_events_total", "status" => status).increment(1);
}

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! watcher / chain client produce:
//!     → logging.rs (structured log events, one span per submission)
//!     → metrics.rs (outcome counters, status counters, durations)
//! ```
//!
//! # Design Decisions
//! - Structured fields instead of interpolated strings where a field is queryable
//! - Every log line of a submission carries its submission id
//! - Metrics go through the `metrics` facade; the embedding binary picks a recorder

pub mod logging;
pub mod metrics;

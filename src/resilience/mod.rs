//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Node connect / status watch:
//!     → timeouts.rs (enforce connect and watch deadlines)
//! ```
//!
//! # Design Decisions
//! - Every wait on the node can be bounded
//! - Nothing is retried: a rejected transaction is reported, not resubmitted

pub mod timeouts;

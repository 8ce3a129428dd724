//! Submit Substrate extrinsics and wait for inclusion or finality.

pub mod chain;
pub mod config;
pub mod demo;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod watcher;

pub use chain::NodeClient;
pub use config::WatcherConfig;
pub use watcher::{submit_and_watch, InclusionReport, TxWatcher, WatchError, WatchOptions};

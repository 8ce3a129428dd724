//! Service lifecycle walkthrough.
//!
//! # Data Flow
//! ```text
//! counters.rs (NextBlueprintId / NextInstanceId / NextJobCallId)
//!     → runner.rs (build each Services call from the ids read so far)
//!     → TxWatcher::submit_and_watch (one watch per step, in order)
//!     → StepReport per step, or the first failing step
//! ```
//!
//! # Roles
//! - Alice publishes a threshold signature blueprint
//! - Bob, Charlie and Dave register as operators with ecdsa keys
//! - Eve requests an instance and calls its `keygen` and `sign` jobs
//! - Bob submits the job results for the operator set

pub mod counters;
pub mod runner;

pub use counters::{Counter, ServiceCounters};
pub use runner::{run_service_demo, DemoError, DemoOptions, StepReport};

//! Transaction submission watcher.
//!
//! # Data Flow
//! ```text
//! submit_and_watch(signer, tx, wait_until_finalized)
//!     → connection.rs (LedgerConnection::sign_and_watch → StatusSubscription)
//!     → state.rs (SubmissionMachine per status event)
//!     → submit.rs (log events / decode module error, release, settle)
//! ```
//!
//! # Invariants
//! - One terminal outcome per submission
//! - The subscription is released exactly once, on every path
//! - No status event is pulled after the terminal one

pub mod connection;
pub mod state;
pub mod submit;

pub use connection::{LedgerConnection, StatusSubscription, Unsubscribe};
pub use state::{Durability, Step, SubmissionMachine, WatchState};
pub use submit::{
    submit_and_watch, InclusionReport, SubmissionId, TxWatcher, WatchError, WatchOptions,
    WatchResult,
};

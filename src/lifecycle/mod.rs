//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging → Connect → Resolve signer
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → abandon the watch, release the subscription, exit
//! ```

pub mod signals;

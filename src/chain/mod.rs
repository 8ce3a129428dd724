//! Node integration subsystem.
//!
//! # Data Flow
//! ```text
//! Secret URI (argument or EXTRINSIC_WATCH_SURI)
//!     → keyring.rs (sr25519 signer, ecdsa operator key)
//! CLI arguments / demo steps
//!     → calls.rs (dynamic call data)
//! Both
//!     → client.rs (sign, broadcast, status stream, error registry)
//!     → watcher (milestone / rejection)
//! ```
//!
//! # Security Constraints
//! - Secret material never logged
//! - Connecting has a deadline
//! - Unencrypted remote endpoints only when explicitly allowed

pub mod calls;
pub mod client;
pub mod keyring;
pub mod types;

pub use client::NodeClient;
pub use types::{
    BlockHash, ChainError, ChainResult, DispatchError, EventRecord, ModuleErrorIndex,
    ModuleErrorMeta, StatusEvent, TxStatus,
};

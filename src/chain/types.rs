//! Chain-facing types and error definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export NodeConfig from config module to avoid duplication
pub use crate::config::schema::NodeConfig;

/// 32-byte block hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHash(pub [u8; 32]);

impl Serialize for BlockHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<[u8; 32]> for BlockHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for BlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Inclusion depth reported by the node for a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    /// Waiting in the pool for an earlier nonce.
    Future,
    /// Validated and ready for inclusion.
    Ready,
    /// Gossiped to peers.
    Broadcast { peers: u32 },
    /// Included in a (best) block.
    InBlock(BlockHash),
    /// The including block is no longer part of the best chain.
    Retracted,
    /// The finality gadget gave up waiting for the including block.
    FinalityTimeout(BlockHash),
    /// The including block was finalized.
    Finalized(BlockHash),
    /// Replaced by another transaction with the same nonce.
    Usurped(BlockHash),
    /// Dropped from the pool.
    Dropped(String),
    /// Declared invalid by the pool.
    Invalid(String),
}

impl TxStatus {
    /// Short lowercase label used in logs and metric labels.
    pub fn label(&self) -> &'static str {
        match self {
            TxStatus::Future => "future",
            TxStatus::Ready => "ready",
            TxStatus::Broadcast { .. } => "broadcast",
            TxStatus::InBlock(_) => "in_block",
            TxStatus::Retracted => "retracted",
            TxStatus::FinalityTimeout(_) => "finality_timeout",
            TxStatus::Finalized(_) => "finalized",
            TxStatus::Usurped(_) => "usurped",
            TxStatus::Dropped(_) => "dropped",
            TxStatus::Invalid(_) => "invalid",
        }
    }
}

/// Raw module error as reported by the runtime, before registry lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleErrorIndex {
    /// Index of the pallet in the runtime.
    pub pallet_index: u8,
    /// Encoded error; the first byte is the variant index.
    pub error: [u8; 4],
}

impl ModuleErrorIndex {
    /// Index of the error variant within the pallet's error enum.
    pub fn error_index(&self) -> u8 {
        self.error[0]
    }
}

/// A runtime-reported failure for a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// Attributable to a specific pallet.
    Module(ModuleErrorIndex),
    /// Any other dispatch failure (bad origin, arithmetic, token, ...).
    Other(String),
}

/// Decoded module error: which pallet, which variant, and its docs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleErrorMeta {
    pub section: String,
    pub name: String,
    pub docs: Vec<String>,
}

impl fmt::Display for ModuleErrorMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section, self.name)
    }
}

/// One event emitted by the runtime while applying the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Originating module, lower camel case (`balances`, `system`).
    pub section: String,
    /// Event variant name (`Transfer`, `ExtrinsicSuccess`).
    pub method: String,
    /// Display rendering of the event fields.
    pub data: String,
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:: {}", self.section, self.method, self.data)
    }
}

/// Point-in-time notification about one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub status: TxStatus,
    pub dispatch_error: Option<DispatchError>,
    pub events: Vec<EventRecord>,
}

impl StatusEvent {
    /// A status notification that carries no events and no error.
    pub fn bare(status: TxStatus) -> Self {
        Self {
            status,
            dispatch_error: None,
            events: Vec::new(),
        }
    }
}

/// Convert a runtime pallet name into the lower camel case section name
/// (`Balances` → `balances`, `MultiAssetDelegation` → `multiAssetDelegation`).
pub fn section_name(pallet: &str) -> String {
    let mut chars = pallet.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Errors that can occur talking to the node or handling keys.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Connecting to the node failed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Connecting did not complete in time.
    #[error("Connection timeout after {0} seconds")]
    ConnectTimeout(u64),

    /// RPC request or subscription failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The node's metadata does not know the requested item.
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// Invalid secret URI, address, or signing failure.
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// Node URL rejected.
    #[error("Invalid node URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

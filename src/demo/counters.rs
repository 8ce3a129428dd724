//! Id counters kept by the Services pallet.

use async_trait::async_trait;

use crate::chain::types::ChainResult;

/// Storage counter that holds the id the next created object receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Blueprint,
    Instance,
    JobCall,
}

impl Counter {
    /// Storage entry name in the `Services` pallet.
    pub fn storage_entry(&self) -> &'static str {
        match self {
            Counter::Blueprint => "NextBlueprintId",
            Counter::Instance => "NextInstanceId",
            Counter::JobCall => "NextJobCallId",
        }
    }
}

/// Reads the current value of a Services counter at the latest block.
#[async_trait]
pub trait ServiceCounters: Send + Sync {
    async fn next_id(&self, counter: Counter) -> ChainResult<u64>;
}

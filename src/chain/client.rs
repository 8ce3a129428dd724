//! Substrate node client over WebSocket JSON-RPC.
//!
//! # Responsibilities
//! - Connect to the node with a deadline
//! - Sign, broadcast and watch transactions
//! - Translate transaction progress into [`StatusEvent`]s
//! - Decode module errors from the node's metadata
//! - Read the Services pallet id counters

use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use subxt::error::DispatchError as RuntimeDispatchError;
use subxt::events::EventDetails;
use subxt::tx::{DynamicPayload, TxInBlock, TxStatus as ProgressStatus};
use subxt::{OnlineClient, PolkadotConfig};
use subxt_signer::sr25519::Keypair;

use crate::chain::types::{
    section_name, BlockHash, ChainError, ChainResult, DispatchError, EventRecord,
    ModuleErrorIndex, ModuleErrorMeta, NodeConfig, StatusEvent, TxStatus,
};
use crate::demo::counters::{Counter, ServiceCounters};
use crate::resilience::timeouts;
use crate::watcher::connection::{LedgerConnection, StatusSubscription};

/// Online subxt client for the node's runtime.
pub type NodeApi = OnlineClient<PolkadotConfig>;

/// Connected node, cheap to clone.
#[derive(Clone)]
pub struct NodeClient {
    api: NodeApi,
    config: NodeConfig,
}

impl NodeClient {
    /// Connect to the configured node and download its metadata.
    pub async fn connect(config: NodeConfig) -> ChainResult<Self> {
        let url = config.url.clone();
        let limit = Duration::from_secs(config.connect_timeout_secs);

        let connect = async {
            if config.allow_insecure {
                NodeApi::from_insecure_url(&url).await
            } else {
                NodeApi::from_url(&url).await
            }
        };

        let api = timeouts::within(Some(limit), connect)
            .await
            .map_err(|_| ChainError::ConnectTimeout(config.connect_timeout_secs))?
            .map_err(|e| ChainError::Connection(format!("{}: {}", url, e)))?;

        let version = api.runtime_version();
        tracing::info!(
            url = %url,
            spec_version = version.spec_version,
            transaction_version = version.transaction_version,
            genesis = %BlockHash::from(api.genesis_hash().0),
            "Connected to node"
        );

        Ok(Self { api, config })
    }

    /// The underlying subxt client.
    pub fn api(&self) -> &NodeApi {
        &self.api
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }
}

#[async_trait]
impl LedgerConnection for NodeClient {
    type Signer = Keypair;
    type Transaction = DynamicPayload;

    async fn sign_and_watch(
        &self,
        signer: &Keypair,
        tx: &DynamicPayload,
    ) -> ChainResult<StatusSubscription> {
        let progress = self
            .api
            .tx()
            .sign_and_submit_then_watch_default(tx, signer)
            .await
            .map_err(|e| ChainError::Rpc(format!("Submission rejected: {}", e)))?;

        tracing::debug!(
            extrinsic = %BlockHash::from(progress.extrinsic_hash().0),
            "Extrinsic broadcast"
        );

        let statuses = progress.then(|status| async move {
            let status = status.map_err(|e| ChainError::Rpc(e.to_string()))?;
            status_event(status).await
        });
        let (statuses, abort) = stream::abortable(statuses);

        Ok(StatusSubscription::new(
            statuses.boxed(),
            Box::new(move || abort.abort()),
        ))
    }

    fn find_meta_error(&self, index: &ModuleErrorIndex) -> ChainResult<ModuleErrorMeta> {
        let metadata = self.api.metadata();
        let pallet = metadata.pallet_by_index(index.pallet_index).ok_or_else(|| {
            ChainError::Metadata(format!("no pallet with index {}", index.pallet_index))
        })?;
        let variant = pallet
            .error_variant_by_index(index.error_index())
            .ok_or_else(|| {
                ChainError::Metadata(format!(
                    "pallet {} has no error with index {}",
                    pallet.name(),
                    index.error_index()
                ))
            })?;

        Ok(ModuleErrorMeta {
            section: section_name(pallet.name()),
            name: variant.name.clone(),
            docs: variant.docs.clone(),
        })
    }
}

#[async_trait]
impl ServiceCounters for NodeClient {
    async fn next_id(&self, counter: Counter) -> ChainResult<u64> {
        let address = subxt::dynamic::storage("Services", counter.storage_entry(), ());
        let value = self
            .api
            .storage()
            .at_latest()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?
            .fetch_or_default(&address)
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?
            .to_value()
            .map_err(|e| ChainError::Metadata(e.to_string()))?;

        value
            .as_u128()
            .and_then(|id| u64::try_from(id).ok())
            .ok_or_else(|| {
                ChainError::Metadata(format!(
                    "Services.{} is not an unsigned integer",
                    counter.storage_entry()
                ))
            })
    }
}

async fn status_event(status: ProgressStatus<PolkadotConfig, NodeApi>) -> ChainResult<StatusEvent> {
    let event = match status {
        ProgressStatus::Validated => StatusEvent::bare(TxStatus::Ready),
        ProgressStatus::Broadcasted { num_peers } => {
            StatusEvent::bare(TxStatus::Broadcast { peers: num_peers })
        }
        ProgressStatus::NoLongerInBestBlock => StatusEvent::bare(TxStatus::Retracted),
        ProgressStatus::InBestBlock(in_block) => included(in_block, false).await?,
        ProgressStatus::InFinalizedBlock(in_block) => included(in_block, true).await?,
        ProgressStatus::Invalid { message } => StatusEvent::bare(TxStatus::Invalid(message)),
        ProgressStatus::Dropped { message } => StatusEvent::bare(TxStatus::Dropped(message)),
        ProgressStatus::Error { message } => return Err(ChainError::Rpc(message)),
    };
    Ok(event)
}

/// Fetch the extrinsic's events from the including block.
async fn included(
    in_block: TxInBlock<PolkadotConfig, NodeApi>,
    finalized: bool,
) -> ChainResult<StatusEvent> {
    let block = BlockHash::from(in_block.block_hash().0);
    let status = if finalized {
        TxStatus::Finalized(block)
    } else {
        TxStatus::InBlock(block)
    };

    match in_block.wait_for_success().await {
        Ok(events) => {
            let mut records = Vec::new();
            for details in events.iter() {
                let details = details.map_err(|e| ChainError::Metadata(e.to_string()))?;
                records.push(event_record(&details));
            }
            Ok(StatusEvent {
                status,
                dispatch_error: None,
                events: records,
            })
        }
        Err(subxt::Error::Runtime(err)) => Ok(StatusEvent {
            status,
            dispatch_error: Some(dispatch_error(&err)),
            events: Vec::new(),
        }),
        Err(e) => Err(ChainError::Rpc(e.to_string())),
    }
}

fn dispatch_error(err: &RuntimeDispatchError) -> DispatchError {
    match err {
        RuntimeDispatchError::Module(module) => {
            // Pallet index followed by the four encoded error bytes.
            let bytes = module.bytes();
            DispatchError::Module(ModuleErrorIndex {
                pallet_index: bytes[0],
                error: [bytes[1], bytes[2], bytes[3], bytes[4]],
            })
        }
        other => DispatchError::Other(other.to_string()),
    }
}

fn event_record(details: &EventDetails<PolkadotConfig>) -> EventRecord {
    let data = match details.field_values() {
        Ok(fields) => fields.to_string(),
        Err(_) => format!("0x{}", hex::encode(details.field_bytes())),
    };
    EventRecord {
        section: section_name(details.pallet_name()),
        method: details.variant_name().to_string(),
        data,
    }
}

impl std::fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeClient")
            .field("url", &self.config.url)
            .field("connect_timeout_secs", &self.config.connect_timeout_secs)
            .finish()
    }
}

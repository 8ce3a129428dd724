//! Submit a transaction and wait for the requested durability milestone.
//!
//! # Responsibilities
//! - Sign and broadcast through a [`LedgerConnection`]
//! - Drive the per-submission state machine over the status stream
//! - Decode module errors into `<section>.<name>` rejections
//! - Release the subscription exactly once, on every exit path

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::chain::types::{BlockHash, ChainError, DispatchError, EventRecord, ModuleErrorMeta};
use crate::config::schema::WatchConfig;
use crate::observability::metrics;
use crate::resilience::timeouts;
use crate::watcher::connection::{LedgerConnection, StatusSubscription};
use crate::watcher::state::{Durability, Step, SubmissionMachine};

/// Correlation id for every log line of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a successful watch observed.
#[derive(Debug, Clone, Serialize)]
pub struct InclusionReport {
    pub submission: SubmissionId,
    pub milestone: Durability,
    pub block_hash: BlockHash,
    /// Events emitted by the transaction, in arrival order.
    pub events: Vec<EventRecord>,
}

/// Ways a watch can end without reaching its milestone.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Module-attributable dispatch error, displayed as `<section>.<name>`.
    #[error("{0}")]
    Module(ModuleErrorMeta),

    /// Dispatch error not attributable to a module.
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    /// The pool or finality gadget gave up on the transaction.
    #[error("Transaction {status}: {reason}")]
    Rejected { status: &'static str, reason: String },

    /// The node closed the status stream before a terminal status.
    #[error("Status stream closed before a terminal status")]
    StreamClosed,

    /// No terminal status within the deadline.
    #[error("No terminal status after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl WatchError {
    fn outcome(&self) -> &'static str {
        match self {
            WatchError::Module(_) => "module_error",
            WatchError::Dispatch(_) => "dispatch_error",
            WatchError::Rejected { .. } => "rejected",
            WatchError::StreamClosed => "stream_closed",
            WatchError::Timeout(_) => "timeout",
            WatchError::Chain(_) => "chain_error",
        }
    }
}

/// Result type for watch operations.
pub type WatchResult<T> = Result<T, WatchError>;

/// Tunables shared by every submission of a [`TxWatcher`].
#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    /// Overall deadline from broadcast to terminal status. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl From<&WatchConfig> for WatchOptions {
    fn from(config: &WatchConfig) -> Self {
        Self {
            timeout: match config.timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }
}

/// Submits transactions through one shared connection.
pub struct TxWatcher<C: LedgerConnection> {
    connection: Arc<C>,
    options: WatchOptions,
}

impl<C: LedgerConnection> TxWatcher<C> {
    pub fn new(connection: Arc<C>, options: WatchOptions) -> Self {
        Self { connection, options }
    }

    pub fn connection(&self) -> &Arc<C> {
        &self.connection
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    /// Sign `tx` with `signer`, broadcast it, and wait until it is in a block
    /// (or finalized when `wait_until_finalized` is set).
    pub async fn submit_and_watch(
        &self,
        signer: &C::Signer,
        tx: &C::Transaction,
        wait_until_finalized: bool,
    ) -> WatchResult<InclusionReport> {
        submit_and_watch(
            self.connection.as_ref(),
            signer,
            tx,
            Durability::from_wait_flag(wait_until_finalized),
            &self.options,
        )
        .await
    }
}

impl<C: LedgerConnection> Clone for TxWatcher<C> {
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            options: self.options.clone(),
        }
    }
}

/// Free-function form of [`TxWatcher::submit_and_watch`].
pub async fn submit_and_watch<C>(
    connection: &C,
    signer: &C::Signer,
    tx: &C::Transaction,
    target: Durability,
    options: &WatchOptions,
) -> WatchResult<InclusionReport>
where
    C: LedgerConnection + ?Sized,
{
    let id = SubmissionId::new();
    let span = tracing::info_span!("submission", id = %id, target = target.label());

    async move {
        let started = Instant::now();

        let mut subscription = match connection.sign_and_watch(signer, tx).await {
            Ok(sub) => sub,
            Err(e) => {
                tracing::warn!(error = %e, "Submission failed");
                metrics::record_outcome("submit_failed", started.elapsed());
                return Err(e.into());
            }
        };
        tracing::debug!("Submitted, awaiting status updates");

        let result = match timeouts::within(
            options.timeout,
            drive(connection, &mut subscription, id, target),
        )
        .await
        {
            Ok(result) => result,
            Err(limit) => {
                tracing::warn!(timeout = ?limit, "No terminal status before deadline");
                Err(WatchError::Timeout(limit))
            }
        };

        // The single release point for every path past a successful broadcast.
        subscription.unsubscribe();

        let outcome = match &result {
            Ok(report) => report.milestone.label(),
            Err(e) => e.outcome(),
        };
        metrics::record_outcome(outcome, started.elapsed());
        result
    }
    .instrument(span)
    .await
}

async fn drive<C>(
    connection: &C,
    subscription: &mut StatusSubscription,
    id: SubmissionId,
    target: Durability,
) -> WatchResult<InclusionReport>
where
    C: LedgerConnection + ?Sized,
{
    let mut machine = SubmissionMachine::new(target);

    while let Some(item) = subscription.next().await {
        let event = item?;
        metrics::record_status(event.status.label());
        tracing::debug!(status = event.status.label(), state = ?machine.state(), "Status update");

        match machine.observe(&event) {
            Step::Pending | Step::Settled => {}
            Step::Included { milestone, block } => {
                tracing::info!(block = %block, milestone = milestone.label(), "Events:");
                for record in &event.events {
                    tracing::info!("{}", record);
                }
                return Ok(InclusionReport {
                    submission: id,
                    milestone,
                    block_hash: block,
                    events: event.events,
                });
            }
            Step::Failed(DispatchError::Module(index)) => {
                let meta = connection.find_meta_error(&index)?;
                tracing::error!("{}: {}", meta, meta.docs.join(" "));
                return Err(WatchError::Module(meta));
            }
            Step::Failed(DispatchError::Other(reason)) => {
                tracing::error!(reason = %reason, "Dispatch failed");
                return Err(WatchError::Dispatch(reason));
            }
            Step::Rejected { status, reason } => {
                tracing::warn!(status, reason = %reason, "Transaction rejected");
                return Err(WatchError::Rejected { status, reason });
            }
        }
    }

    Err(WatchError::StreamClosed)
}

//! Per-submission state machine.
//!
//! ```text
//! Submitted ──in-block (target InBlock)──────────────▶ Terminal
//!     │                                                  ▲
//!     └─in-block (target Finalized)─▶ AwaitingFinalization ─finalized─┘
//!
//! Any state ──dispatch error / pool rejection──▶ Terminal
//! ```
//!
//! The machine is pure: it never touches the subscription. The caller acts on
//! the returned [`Step`] and, once a terminal step was returned, every further
//! event yields [`Step::Settled`].

use serde::{Deserialize, Serialize};

use crate::chain::types::{BlockHash, DispatchError, StatusEvent, TxStatus};

/// Durability milestone a caller waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Durability {
    InBlock,
    Finalized,
}

impl Durability {
    pub fn from_wait_flag(wait_until_finalized: bool) -> Self {
        if wait_until_finalized {
            Durability::Finalized
        } else {
            Durability::InBlock
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Durability::InBlock => "in_block",
            Durability::Finalized => "finalized",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Submitted,
    AwaitingFinalization,
    Terminal,
}

/// What the caller must do after feeding one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Keep waiting.
    Pending,
    /// Target reached: log events, release, resolve.
    Included { milestone: Durability, block: BlockHash },
    /// Runtime dispatch failure: release, reject.
    Failed(DispatchError),
    /// The pool or finality gadget gave up on the transaction: release, reject.
    Rejected { status: &'static str, reason: String },
    /// A terminal step was already returned; ignore the event.
    Settled,
}

impl Step {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Step::Included { .. } | Step::Failed(_) | Step::Rejected { .. })
    }
}

#[derive(Debug)]
pub struct SubmissionMachine {
    target: Durability,
    state: WatchState,
}

impl SubmissionMachine {
    pub fn new(target: Durability) -> Self {
        Self {
            target,
            state: WatchState::Submitted,
        }
    }

    pub fn target(&self) -> Durability {
        self.target
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Feed the next status event in arrival order.
    pub fn observe(&mut self, event: &StatusEvent) -> Step {
        if self.state == WatchState::Terminal {
            return Step::Settled;
        }

        // Dispatch errors win over whatever status accompanies them.
        if let Some(err) = &event.dispatch_error {
            return self.settle(Step::Failed(err.clone()));
        }

        match &event.status {
            TxStatus::Future | TxStatus::Ready | TxStatus::Broadcast { .. } => Step::Pending,
            TxStatus::InBlock(block) => match self.target {
                Durability::InBlock => self.settle(Step::Included {
                    milestone: Durability::InBlock,
                    block: *block,
                }),
                Durability::Finalized => {
                    self.state = WatchState::AwaitingFinalization;
                    Step::Pending
                }
            },
            // Finalization also satisfies an in-block target whose in-block
            // notification was never delivered.
            TxStatus::Finalized(block) => self.settle(Step::Included {
                milestone: Durability::Finalized,
                block: *block,
            }),
            TxStatus::Retracted => {
                self.state = WatchState::Submitted;
                Step::Pending
            }
            TxStatus::FinalityTimeout(block) => self.settle(Step::Rejected {
                status: event.status.label(),
                reason: format!("finality not reached for block {}", block),
            }),
            TxStatus::Usurped(by) => self.settle(Step::Rejected {
                status: event.status.label(),
                reason: format!("replaced by transaction {}", by),
            }),
            TxStatus::Dropped(reason) | TxStatus::Invalid(reason) => self.settle(Step::Rejected {
                status: event.status.label(),
                reason: reason.clone(),
            }),
        }
    }

    fn settle(&mut self, step: Step) -> Step {
        self.state = WatchState::Terminal;
        step
    }
}

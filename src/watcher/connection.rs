//! The seam between the watcher and whatever talks to the node.

use std::fmt;

use async_trait::async_trait;
use futures_util::stream::{BoxStream, StreamExt};

use crate::chain::types::{ChainResult, ModuleErrorIndex, ModuleErrorMeta, StatusEvent};

/// A ledger node connection the watcher can submit through.
#[async_trait]
pub trait LedgerConnection: Send + Sync {
    /// Identity able to sign `Transaction`s.
    type Signer: Send + Sync + ?Sized;
    /// Already-built call data.
    type Transaction: Send + Sync + ?Sized;

    /// Sign and broadcast `tx`, returning the live status stream for it.
    async fn sign_and_watch(
        &self,
        signer: &Self::Signer,
        tx: &Self::Transaction,
    ) -> ChainResult<StatusSubscription>;

    /// Look up a module error in the node's registry.
    fn find_meta_error(&self, index: &ModuleErrorIndex) -> ChainResult<ModuleErrorMeta>;
}

/// Callback that cancels the node-side subscription.
pub type Unsubscribe = Box<dyn FnOnce() + Send + 'static>;

/// Status stream for one submission plus its unsubscribe handle.
///
/// The handle runs at most once: either through [`StatusSubscription::unsubscribe`]
/// or, if that never happened, when the subscription is dropped.
pub struct StatusSubscription {
    events: Option<BoxStream<'static, ChainResult<StatusEvent>>>,
    unsubscribe: Option<Unsubscribe>,
}

impl StatusSubscription {
    pub fn new(events: BoxStream<'static, ChainResult<StatusEvent>>, unsubscribe: Unsubscribe) -> Self {
        Self {
            events: Some(events),
            unsubscribe: Some(unsubscribe),
        }
    }

    /// Next status event, or `None` once the stream ended or was released.
    pub async fn next(&mut self) -> Option<ChainResult<StatusEvent>> {
        match self.events.as_mut() {
            Some(events) => events.next().await,
            None => None,
        }
    }

    /// Release the stream and cancel the subscription. Idempotent.
    pub fn unsubscribe(&mut self) {
        self.events = None;
        if let Some(unsub) = self.unsubscribe.take() {
            unsub();
        }
    }

    /// Whether the unsubscribe handle already ran.
    pub fn is_released(&self) -> bool {
        self.unsubscribe.is_none()
    }
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        if !self.is_released() {
            tracing::debug!("Status subscription dropped without explicit release");
            self.unsubscribe();
        }
    }
}

impl fmt::Debug for StatusSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusSubscription")
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::types::TxStatus;
    use futures_util::stream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counted(events: Vec<StatusEvent>) -> (StatusSubscription, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let sub = StatusSubscription::new(
            stream::iter(events.into_iter().map(Ok)).boxed(),
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        (sub, calls)
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let (mut sub, calls) = counted(vec![StatusEvent::bare(TxStatus::Ready)]);
        sub.unsubscribe();
        sub.unsubscribe();
        assert!(sub.is_released());
        assert!(sub.next().await.is_none());
        drop(sub);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_drop_releases() {
        let (mut sub, calls) = counted(vec![StatusEvent::bare(TxStatus::Ready)]);
        assert!(sub.next().await.is_some());
        drop(sub);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

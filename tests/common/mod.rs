//! Shared utilities for watcher integration tests.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};

use extrinsic_watch::chain::types::{
    BlockHash, ChainError, ChainResult, DispatchError, EventRecord, ModuleErrorIndex,
    ModuleErrorMeta, StatusEvent, TxStatus,
};
use extrinsic_watch::watcher::{LedgerConnection, StatusSubscription};

/// Connection that replays a fixed script of status updates.
pub struct MockConnection {
    script: Mutex<Option<Vec<ChainResult<StatusEvent>>>>,
    keep_open: bool,
    submit_error: Option<String>,
    registry: HashMap<(u8, u8), ModuleErrorMeta>,
    unsubscribes: Arc<AtomicUsize>,
    delivered: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockConnection {
    pub fn new(script: Vec<StatusEvent>) -> Self {
        Self::with_items(script.into_iter().map(Ok).collect())
    }

    pub fn with_items(items: Vec<ChainResult<StatusEvent>>) -> Self {
        Self {
            script: Mutex::new(Some(items)),
            keep_open: false,
            submit_error: None,
            registry: HashMap::new(),
            unsubscribes: Arc::new(AtomicUsize::new(0)),
            delivered: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The node rejects the submission outright.
    pub fn failing_submit(message: &str) -> Self {
        let mut mock = Self::new(Vec::new());
        mock.submit_error = Some(message.to_string());
        mock
    }

    /// Leave the stream open after the script is exhausted.
    pub fn keep_open(mut self) -> Self {
        self.keep_open = true;
        self
    }

    pub fn with_module_error(mut self, pallet_index: u8, error_index: u8, section: &str, name: &str, docs: &str) -> Self {
        self.registry.insert(
            (pallet_index, error_index),
            ModuleErrorMeta {
                section: section.to_string(),
                name: name.to_string(),
                docs: vec![docs.to_string()],
            },
        );
        self
    }

    pub fn unsubscribe_count(&self) -> usize {
        self.unsubscribes.load(Ordering::SeqCst)
    }

    /// Number of status updates the watcher pulled from the stream.
    pub fn delivered_count(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerConnection for MockConnection {
    type Signer = str;
    type Transaction = str;

    async fn sign_and_watch(&self, _signer: &str, _tx: &str) -> ChainResult<StatusSubscription> {
        if let Some(message) = &self.submit_error {
            return Err(ChainError::Rpc(message.clone()));
        }

        let items = self
            .script
            .lock()
            .unwrap()
            .take()
            .expect("mock connection supports a single submission");

        let delivered = self.delivered.clone();
        let scripted = stream::iter(items).inspect(move |_| {
            delivered.fetch_add(1, Ordering::SeqCst);
        });
        let events = if self.keep_open {
            scripted.chain(stream::pending()).boxed()
        } else {
            scripted.boxed()
        };

        let unsubscribes = self.unsubscribes.clone();
        Ok(StatusSubscription::new(
            events,
            Box::new(move || {
                unsubscribes.fetch_add(1, Ordering::SeqCst);
            }),
        ))
    }

    fn find_meta_error(&self, index: &ModuleErrorIndex) -> ChainResult<ModuleErrorMeta> {
        self.registry
            .get(&(index.pallet_index, index.error_index()))
            .cloned()
            .ok_or_else(|| ChainError::Metadata(format!("unknown module error {:?}", index)))
    }
}

#[allow(dead_code)]
pub fn hash(n: u8) -> BlockHash {
    BlockHash([n; 32])
}

#[allow(dead_code)]
pub fn record(section: &str, method: &str, data: &str) -> EventRecord {
    EventRecord {
        section: section.to_string(),
        method: method.to_string(),
        data: data.to_string(),
    }
}

#[allow(dead_code)]
pub fn in_block(n: u8, events: Vec<EventRecord>) -> StatusEvent {
    StatusEvent {
        status: TxStatus::InBlock(hash(n)),
        dispatch_error: None,
        events,
    }
}

#[allow(dead_code)]
pub fn finalized(n: u8, events: Vec<EventRecord>) -> StatusEvent {
    StatusEvent {
        status: TxStatus::Finalized(hash(n)),
        dispatch_error: None,
        events,
    }
}

#[allow(dead_code)]
pub fn module_failure(n: u8, pallet_index: u8, error_index: u8) -> StatusEvent {
    StatusEvent {
        status: TxStatus::InBlock(hash(n)),
        dispatch_error: Some(DispatchError::Module(ModuleErrorIndex {
            pallet_index,
            error: [error_index, 0, 0, 0],
        })),
        events: Vec::new(),
    }
}

/// In-memory sink for `tracing` output.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

#[allow(dead_code)]
impl LogCapture {
    /// Install a plain-text subscriber writing here for the current thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::INFO)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

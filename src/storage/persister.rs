//! Write policy between in-memory state and a [`KeyValueStore`].
//!
//! Under [`PersistencePolicy::WriteThrough`] a `put` returns once the store
//! has applied it. Under [`PersistencePolicy::WriteBehind`] a `put` only
//! enqueues; a single writer task applies writes in the order they were
//! queued, and every write queued before a [`Persister::flush`] call is
//! applied by the time that call returns.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistencePolicy {
    #[default]
    WriteThrough,
    WriteBehind,
}

enum WriteOp {
    Put { key: String, value: Value },
    Flush(oneshot::Sender<()>),
}

enum Mode {
    Through,
    Behind {
        tx: mpsc::UnboundedSender<WriteOp>,
        worker: JoinHandle<()>,
    },
}

pub struct Persister {
    store: Arc<dyn KeyValueStore>,
    mode: Mode,
}

impl Persister {
    /// Build a persister. `WriteBehind` spawns its writer task, so it must be
    /// called from within a Tokio runtime.
    pub fn new(store: Arc<dyn KeyValueStore>, policy: PersistencePolicy) -> Self {
        let mode = match policy {
            PersistencePolicy::WriteThrough => Mode::Through,
            PersistencePolicy::WriteBehind => {
                let (tx, rx) = mpsc::unbounded_channel();
                let worker = tokio::spawn(run_writer(Arc::clone(&store), rx));
                Mode::Behind { tx, worker }
            }
        };
        Self { store, mode }
    }

    pub fn policy(&self) -> PersistencePolicy {
        match self.mode {
            Mode::Through => PersistencePolicy::WriteThrough,
            Mode::Behind { .. } => PersistencePolicy::WriteBehind,
        }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Read a key on the blocking pool.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let store = Arc::clone(&self.store);
        let key = key.to_string();
        match tokio::task::spawn_blocking(move || store.get(&key)).await {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, "storage read task failed");
                None
            }
        }
    }

    /// Persist a value under the configured policy.
    pub async fn put(&self, key: &str, value: Value) {
        match &self.mode {
            Mode::Through => write_blocking(Arc::clone(&self.store), key.to_string(), value).await,
            Mode::Behind { tx, .. } => {
                let op = WriteOp::Put {
                    key: key.to_string(),
                    value,
                };
                if tx.send(op).is_err() {
                    tracing::error!(key, "write-behind queue closed, write dropped");
                }
            }
        }
    }

    /// Wait until every previously queued write has been applied.
    pub async fn flush(&self) {
        if let Mode::Behind { tx, .. } = &self.mode {
            let (ack_tx, ack_rx) = oneshot::channel();
            if tx.send(WriteOp::Flush(ack_tx)).is_err() {
                tracing::error!("write-behind queue closed, nothing to flush");
                return;
            }
            if ack_rx.await.is_err() {
                tracing::error!("write-behind writer stopped before flush completed");
            }
        }
    }

    /// Drain queued writes and stop the writer task.
    pub async fn shutdown(self) {
        if let Mode::Behind { tx, worker } = self.mode {
            drop(tx);
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "write-behind writer panicked");
            }
        }
    }
}

async fn run_writer(store: Arc<dyn KeyValueStore>, mut rx: mpsc::UnboundedReceiver<WriteOp>) {
    while let Some(op) = rx.recv().await {
        match op {
            WriteOp::Put { key, value } => write_blocking(Arc::clone(&store), key, value).await,
            WriteOp::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    tracing::debug!("write-behind writer exiting");
}

async fn write_blocking(store: Arc<dyn KeyValueStore>, key: String, value: Value) {
    if let Err(e) = tokio::task::spawn_blocking(move || store.set(&key, value)).await {
        tracing::error!(error = %e, "storage write task failed");
    }
}

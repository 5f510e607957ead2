//! Chunked, best-effort persistence of per-round counter updates.

use crate::boundary::roster::{PlayerUpdate, RosterStore};
use crate::boundary::StoreError;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Largest batch sent to the roster store in one call.
pub const PERSIST_CHUNK_SIZE: usize = 25;

/// Outcome of a chunked write. Failed chunks are not retried or rolled back.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersistenceReport {
    pub applied: usize,
    /// (chunk index, error) for each chunk the store rejected.
    pub failed_chunks: Vec<(usize, StoreError)>,
}

impl PersistenceReport {
    pub fn is_complete(&self) -> bool {
        self.failed_chunks.is_empty()
    }
}

/// Write `updates` in chunks of at most `chunk_size`, continuing past failures.
pub fn persist_in_chunks(
    store: &dyn RosterStore,
    updates: &[PlayerUpdate],
    chunk_size: usize,
) -> PersistenceReport {
    let mut report = PersistenceReport::default();
    for (i, chunk) in updates.chunks(chunk_size.max(1)).enumerate() {
        match store.batch_update(chunk) {
            Ok(rows) => report.applied += rows,
            Err(e) => {
                log::warn!("Persistence chunk {} ({} updates) failed: {}", i, chunk.len(), e);
                report.failed_chunks.push((i, e));
            }
        }
    }
    if !report.is_complete() {
        log::warn!(
            "Partial persistence: {} chunk(s) failed, {} row(s) applied",
            report.failed_chunks.len(),
            report.applied
        );
    }
    report
}

/// Receives each round's updates from the orchestrator.
pub trait BatchWriter: Send + Sync {
    fn submit(&self, updates: Vec<PlayerUpdate>);
}

/// Writes synchronously on the caller's thread.
pub struct ImmediateWriter {
    store: Arc<dyn RosterStore>,
}

impl ImmediateWriter {
    pub fn new(store: Arc<dyn RosterStore>) -> Self {
        Self { store }
    }
}

impl BatchWriter for ImmediateWriter {
    fn submit(&self, updates: Vec<PlayerUpdate>) {
        persist_in_chunks(self.store.as_ref(), &updates, PERSIST_CHUNK_SIZE);
    }
}

type Job = (Vec<PlayerUpdate>, Option<oneshot::Sender<PersistenceReport>>);

/// Writes on tokio blocking tasks so round generation never waits on the store.
/// Batches are applied one at a time in submission order.
pub struct BackgroundWriter {
    queue: mpsc::UnboundedSender<Job>,
}

impl BackgroundWriter {
    /// Must be called from within a tokio runtime.
    pub fn new(store: Arc<dyn RosterStore>) -> Self {
        let (queue, mut jobs) = mpsc::unbounded_channel::<Job>();
        tokio::runtime::Handle::current().spawn(async move {
            while let Some((updates, ack)) = jobs.recv().await {
                let store = Arc::clone(&store);
                let total = updates.len();
                let written = tokio::task::spawn_blocking(move || {
                    persist_in_chunks(store.as_ref(), &updates, PERSIST_CHUNK_SIZE)
                })
                .await;
                match written {
                    Ok(report) => {
                        log::debug!("Persisted {} of {} update(s)", report.applied, total);
                        if let Some(ack) = ack {
                            let _ = ack.send(report);
                        }
                    }
                    Err(e) => log::error!("Persistence task failed: {}", e),
                }
            }
        });
        Self { queue }
    }

    /// Queue `updates` behind every earlier batch; the receiver resolves once they are written.
    pub fn submit_acked(
        &self,
        updates: Vec<PlayerUpdate>,
    ) -> oneshot::Receiver<PersistenceReport> {
        let (ack, done) = oneshot::channel();
        self.enqueue(updates, Some(ack));
        done
    }

    fn enqueue(&self, updates: Vec<PlayerUpdate>, ack: Option<oneshot::Sender<PersistenceReport>>) {
        let count = updates.len();
        if self.queue.send((updates, ack)).is_err() {
            log::warn!("Persistence worker stopped; dropped {} update(s)", count);
        }
    }
}

impl BatchWriter for BackgroundWriter {
    fn submit(&self, updates: Vec<PlayerUpdate>) {
        if updates.is_empty() {
            return;
        }
        self.enqueue(updates, None);
    }
}

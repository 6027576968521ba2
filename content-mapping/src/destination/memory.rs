use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use content_mapping_config::shared::BatchConfig;
use futures::StreamExt;
use futures::stream;
use metrics::counter;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::destination::{DestinationAdapter, DestinationCapabilities};
use crate::document::Document;
use crate::error::SyncResult;
use crate::metrics::{CONTENT_MAPPING_FLUSHED_WRITES_TOTAL, DESTINATION_LABEL};
use crate::types::{RecordId, RecordStream};

/// A buffered write waiting for the next flush.
#[derive(Debug, Clone)]
enum PendingWrite {
    Upsert(Document),
    Delete { class_name: String, id: RecordId },
}

#[derive(Debug, Default)]
struct Inner {
    documents: HashMap<String, BTreeMap<RecordId, Document>>,
    pending: Vec<PendingWrite>,
    flushes: u64,
    commits: u64,
}

impl Inner {
    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let pending = std::mem::take(&mut self.pending);
        let (upserts, deletes) = pending.iter().fold((0u64, 0u64), |(upserts, deletes), write| {
            match write {
                PendingWrite::Upsert(_) => (upserts + 1, deletes),
                PendingWrite::Delete { .. } => (upserts, deletes + 1),
            }
        });
        info!(upserts, deletes, "flushing buffered writes");

        for write in pending {
            match write {
                PendingWrite::Upsert(document) => {
                    self.documents
                        .entry(document.class_name.clone())
                        .or_default()
                        .insert(document.id, document);
                }
                PendingWrite::Delete { class_name, id } => {
                    if let Some(documents) = self.documents.get_mut(&class_name) {
                        documents.remove(&id);
                    }
                }
            }
        }

        counter!(
            CONTENT_MAPPING_FLUSHED_WRITES_TOTAL,
            DESTINATION_LABEL => MemoryDestination::name(),
        )
        .increment(upserts + deletes);

        self.flushes += 1;
    }
}

/// In-memory destination for testing and development purposes.
///
/// [`MemoryDestination`] stores [`Document`]s per record class. Deletes and writes are
/// buffered and applied in batches: once the buffer holds [`BatchConfig::max_size`] writes it
/// is flushed after the current record, and whatever is left is flushed on commit. Iteration
/// only sees flushed documents. Starting a new iteration discards writes left buffered by a
/// pass that failed before committing; batches that were already flushed stay applied.
///
/// Clones share the same storage, so a test can keep a handle for inspection after moving the
/// destination into a synchronizer.
#[derive(Debug, Clone)]
pub struct MemoryDestination {
    inner: Arc<Mutex<Inner>>,
    batch: BatchConfig,
}

impl MemoryDestination {
    /// Creates an empty destination with the default batch configuration.
    pub fn new() -> Self {
        Self::with_batch_config(BatchConfig::default())
    }

    /// Creates an empty destination flushing after `batch.max_size` buffered writes.
    pub fn with_batch_config(batch: BatchConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            batch,
        }
    }

    /// Stores `documents` as already persisted, bypassing the write buffer.
    pub async fn seed(&self, documents: impl IntoIterator<Item = Document>) {
        let mut inner = self.inner.lock().await;
        for document in documents {
            inner
                .documents
                .entry(document.class_name.clone())
                .or_default()
                .insert(document.id, document);
        }
    }

    /// Returns a copy of all persisted `class_name` documents, ordered by id.
    pub async fn documents(&self, class_name: &str) -> Vec<Document> {
        let inner = self.inner.lock().await;
        inner
            .documents
            .get(class_name)
            .map(|documents| documents.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the number of writes waiting for the next flush.
    pub async fn pending_writes(&self) -> usize {
        self.inner.lock().await.pending.len()
    }

    /// Returns how many non-empty flushes happened.
    pub async fn flushes(&self) -> u64 {
        self.inner.lock().await.flushes
    }

    /// Returns how many times [`DestinationAdapter::commit`] was called.
    pub async fn commits(&self) -> u64 {
        self.inner.lock().await.commits
    }

    /// Removes all documents and buffered writes.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.documents.clear();
        inner.pending.clear();
    }
}

impl Default for MemoryDestination {
    fn default() -> Self {
        Self::new()
    }
}

impl DestinationAdapter for MemoryDestination {
    type Object = Document;

    fn name() -> &'static str {
        "memory"
    }

    fn capabilities(&self) -> DestinationCapabilities {
        DestinationCapabilities {
            updateable_object_provider: false,
            progress_listener: true,
        }
    }

    async fn objects_ordered_by_id(&self, class_name: &str) -> SyncResult<RecordStream<'_, Document>> {
        let documents = {
            let mut inner = self.inner.lock().await;

            // Writes still buffered here belong to a pass that never committed.
            if !inner.pending.is_empty() {
                warn!(
                    discarded = inner.pending.len(),
                    "discarding uncommitted writes of a previous pass"
                );
                inner.pending.clear();
            }

            inner
                .documents
                .get(class_name)
                .map(|documents| documents.values().cloned().collect::<Vec<_>>())
                .unwrap_or_default()
        };
        info!(
            class_name,
            count = documents.len(),
            "found documents in memory destination"
        );

        Ok(stream::iter(documents.into_iter().map(Ok)).boxed())
    }

    async fn create_object(&self, id: RecordId, class_name: &str) -> SyncResult<Document> {
        Ok(Document::created(id, class_name))
    }

    async fn delete(&self, document: &Document) -> SyncResult<()> {
        let mut inner = self.inner.lock().await;
        inner.pending.push(PendingWrite::Delete {
            class_name: document.class_name.clone(),
            id: document.id,
        });

        Ok(())
    }

    async fn updated(&self, document: Document) -> SyncResult<()> {
        let mut inner = self.inner.lock().await;
        inner.pending.push(PendingWrite::Upsert(document));

        Ok(())
    }

    async fn commit(&self) -> SyncResult<()> {
        let mut inner = self.inner.lock().await;
        inner.flush();
        inner.commits += 1;

        debug!(commits = inner.commits, "committed memory destination");

        Ok(())
    }

    fn id_of(&self, document: &Document) -> RecordId {
        document.id
    }

    async fn after_object_processed(&self) -> SyncResult<()> {
        let mut inner = self.inner.lock().await;
        if inner.pending.len() >= self.batch.max_size {
            inner.flush();
        }

        Ok(())
    }
}

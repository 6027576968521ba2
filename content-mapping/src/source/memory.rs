use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use tracing::debug;

use crate::error::SyncResult;
use crate::source::SourceAdapter;
use crate::types::RecordStream;

/// In-memory source for tests and development.
///
/// Records are yielded in the order they were given. The order is not corrected, so a
/// synchronizer reading from this source still detects unordered input.
#[derive(Debug, Clone)]
pub struct MemorySource<T> {
    records: Arc<Vec<T>>,
}

impl<T> MemorySource<T> {
    /// Creates a source yielding `records` in the given order.
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T> Default for MemorySource<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> FromIterator<T> for MemorySource<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> SourceAdapter for MemorySource<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Record = T;

    fn name() -> &'static str {
        "memory"
    }

    async fn records_ordered_by_id(&self) -> SyncResult<RecordStream<'_, T>> {
        debug!(count = self.records.len(), "streaming in-memory source records");

        Ok(stream::iter(self.records.iter().cloned().map(Ok)).boxed())
    }
}

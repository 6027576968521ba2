use futures::StreamExt;
use futures::stream;

use crate::error::{ErrorKind, SyncResult};
use crate::source::SourceAdapter;
use crate::sync_error;
use crate::test_utils::calls::{Call, CallLog};
use crate::test_utils::records::TestRecord;
use crate::types::RecordStream;

/// Source yielding fixed [`TestRecord`]s in the given order, which may be out of order.
#[derive(Debug, Clone)]
pub struct RecordingSource {
    records: Vec<TestRecord>,
    fail_after: Option<usize>,
    log: CallLog,
}

impl RecordingSource {
    pub fn new(log: &CallLog, records: Vec<TestRecord>) -> Self {
        Self {
            records,
            fail_after: None,
            log: log.clone(),
        }
    }

    /// Makes the stream yield a [`ErrorKind::SourceError`] after `count` records.
    pub fn fail_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }
}

impl SourceAdapter for RecordingSource {
    type Record = TestRecord;

    fn name() -> &'static str {
        "recording"
    }

    async fn records_ordered_by_id(&self) -> SyncResult<RecordStream<'_, TestRecord>> {
        self.log.push(Call::SourceRecords);

        let mut items: Vec<SyncResult<TestRecord>> = match self.fail_after {
            Some(count) => self.records.iter().take(count).cloned().map(Ok).collect(),
            None => self.records.iter().cloned().map(Ok).collect(),
        };

        if self.fail_after.is_some() {
            items.push(Err(sync_error!(
                ErrorKind::SourceError,
                "Injected source failure"
            )));
        }

        Ok(stream::iter(items).boxed())
    }
}

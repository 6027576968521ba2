use std::future::Future;

use crate::error::SyncResult;
use crate::types::RecordStream;

/// Adapter for a source system (e.g. a relational database) holding the records that should be
/// mapped into a destination system.
///
/// One adapter instance is configured for one record class.
pub trait SourceAdapter {
    /// Record type yielded by this source.
    type Record: Send;

    /// Returns the name of the source, used in logs.
    fn name() -> &'static str;

    /// Returns a stream over all records, ordered by ascending id.
    ///
    /// Every call must start a fresh pass positioned at the first record.
    fn records_ordered_by_id(
        &self,
    ) -> impl Future<Output = SyncResult<RecordStream<'_, Self::Record>>> + Send;
}

//! Merge-diff synchronization of a destination system with a source system.
//!
//! A pass walks the source records and the destination objects of one record class side by
//! side, both ascending by id:
//!
//! - a source id below the current destination id has no counterpart and is inserted,
//! - a destination id below the current source id is outdated and is deleted,
//! - equal ids are mapped again and written back if the mapper reports a change.
//!
//! Once one side is exhausted, the rest of the other side is inserted or deleted. The
//! destination is committed exactly once at the end of a successful pass.

use std::cmp::Ordering;
use std::fmt;
use std::path::Path;
use std::time::Instant;

use content_mapping_config::load_synchronizer_config;
use content_mapping_config::shared::SynchronizerConfig;
use futures::TryStreamExt;
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::bail;
use crate::destination::{DestinationAdapter, DestinationCapabilities};
use crate::error::{ErrorKind, SyncResult};
use crate::mapper::{MapResult, Mapper};
use crate::metrics::{
    CLASS_NAME_LABEL, CONTENT_MAPPING_RECORDS_PROCESSED_TOTAL,
    CONTENT_MAPPING_SYNC_DURATION_SECONDS, CONTENT_MAPPING_SYNC_FAILURES_TOTAL,
    DESTINATION_LABEL, OPERATION_LABEL,
};
use crate::source::SourceAdapter;
use crate::types::RecordId;

/// Counts of what a successful pass did to the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    /// New objects created and written.
    pub inserted: u64,
    /// Existing objects written back after a change.
    pub updated: u64,
    /// Existing objects left untouched.
    pub kept: u64,
    /// Objects removed because they are outdated or no longer mappable.
    pub deleted: u64,
    /// Source records that were neither inserted nor deleted.
    pub skipped: u64,
}

impl SyncSummary {
    /// Returns the number of records the pass handled.
    pub fn processed(&self) -> u64 {
        self.inserted + self.updated + self.kept + self.deleted + self.skipped
    }

    /// Returns `true` if the pass sent any write to the destination.
    pub fn has_changes(&self) -> bool {
        self.inserted > 0 || self.updated > 0 || self.deleted > 0
    }

    fn record(&mut self, operation: Operation) {
        match operation {
            Operation::Insert => self.inserted += 1,
            Operation::Update => self.updated += 1,
            Operation::Keep => self.kept += 1,
            Operation::Delete => self.deleted += 1,
            Operation::Skip => self.skipped += 1,
        }
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "inserted={} updated={} kept={} deleted={} skipped={}",
            self.inserted, self.updated, self.kept, self.deleted, self.skipped
        )
    }
}

/// Outcome of handling a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Insert,
    Update,
    Keep,
    Delete,
    Skip,
}

impl Operation {
    fn as_str(&self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Keep => "keep",
            Operation::Delete => "delete",
            Operation::Skip => "skip",
        }
    }
}

/// Side of the merge an id was read from.
#[derive(Debug, Clone, Copy)]
enum Side {
    Source,
    Destination,
}

/// Tracks the last id read from one side and rejects ids going backwards.
///
/// Equal ids are accepted, the current element is checked again on every loop iteration.
#[derive(Debug)]
struct IdOrder {
    side: Side,
    last_seen: Option<RecordId>,
}

impl IdOrder {
    fn new(side: Side) -> Self {
        Self {
            side,
            last_seen: None,
        }
    }

    fn observe(&mut self, id: RecordId) -> SyncResult<RecordId> {
        if let Some(last_seen) = self.last_seen {
            if id < last_seen {
                let detail = format!("id {id} was read after id {last_seen}");
                match self.side {
                    Side::Source => bail!(
                        ErrorKind::SourceIdsOutOfOrder,
                        "Source ids are out of order",
                        detail = detail
                    ),
                    Side::Destination => bail!(
                        ErrorKind::DestinationIdsOutOfOrder,
                        "Destination ids are out of order",
                        detail = detail
                    ),
                }
            }
        }

        self.last_seen = Some(id);

        Ok(id)
    }
}

/// Keeps a destination system in sync with a source system.
///
/// The synchronizer owns its three collaborators. Optional destination capabilities are read
/// once on construction.
pub struct Synchronizer<S, M, D> {
    source: S,
    mapper: M,
    destination: D,
    capabilities: DestinationCapabilities,
}

impl<S, M, D> Synchronizer<S, M, D>
where
    S: SourceAdapter,
    D: DestinationAdapter,
    M: Mapper<S::Record, D::Object>,
{
    /// Creates a synchronizer from its collaborators.
    pub fn new(source: S, mapper: M, destination: D) -> Self {
        let capabilities = destination.capabilities();

        Self {
            source,
            mapper,
            destination,
            capabilities,
        }
    }

    /// Returns the source records are read from.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the mapper, which keeps the force flag of the last pass.
    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Returns the destination objects are written to.
    pub fn destination(&self) -> &D {
        &self.destination
    }

    /// Returns the destination capabilities detected on construction.
    pub fn capabilities(&self) -> DestinationCapabilities {
        self.capabilities
    }

    /// Consumes the synchronizer and returns its collaborators.
    pub fn into_parts(self) -> (S, M, D) {
        (self.source, self.mapper, self.destination)
    }

    /// Loads the configuration stored in `configuration_directory` and runs one pass with it.
    ///
    /// See [`load_synchronizer_config`] for the file layout and environment overrides.
    pub async fn run_from_directory(
        &mut self,
        configuration_directory: &Path,
    ) -> SyncResult<SyncSummary> {
        let config = load_synchronizer_config(configuration_directory)?;

        self.run(&config).await
    }

    /// Validates `config` and runs one pass for its record class.
    pub async fn run(&mut self, config: &SynchronizerConfig) -> SyncResult<SyncSummary> {
        config.validate()?;

        self.synchronize(&config.class_name, config.force).await
    }

    /// Runs one synchronization pass for `class_name`.
    ///
    /// With `force` set, the mapper is told to report every matched object as changed, so
    /// all of them are written again.
    ///
    /// Returns after the destination has been committed. Out-of-order ids fail the pass with
    /// an integrity violation, and collaborator errors are returned as they are. In both cases
    /// the destination is not committed and writes already sent are not rolled back.
    pub async fn synchronize(&mut self, class_name: &str, force: bool) -> SyncResult<SyncSummary> {
        info!(
            class_name,
            force,
            source = S::name(),
            destination = D::name(),
            "starting synchronization"
        );

        let started_at = Instant::now();
        let result = self.run_pass(class_name, force).await;

        match &result {
            Ok(summary) => {
                histogram!(
                    CONTENT_MAPPING_SYNC_DURATION_SECONDS,
                    CLASS_NAME_LABEL => class_name.to_string(),
                    DESTINATION_LABEL => D::name(),
                )
                .record(started_at.elapsed().as_secs_f64());

                info!(
                    class_name,
                    inserted = summary.inserted,
                    updated = summary.updated,
                    kept = summary.kept,
                    deleted = summary.deleted,
                    skipped = summary.skipped,
                    "synchronization completed"
                );
            }
            Err(err) => {
                counter!(
                    CONTENT_MAPPING_SYNC_FAILURES_TOTAL,
                    CLASS_NAME_LABEL => class_name.to_string(),
                    DESTINATION_LABEL => D::name(),
                )
                .increment(1);

                error!(
                    class_name,
                    kind = ?err.kind(),
                    integrity_violation = err.is_integrity_violation(),
                    "synchronization failed"
                );
            }
        }

        result
    }

    async fn run_pass(&mut self, class_name: &str, force: bool) -> SyncResult<SyncSummary> {
        self.mapper.set_force(force);

        let mut pass = SyncPass {
            mapper: &self.mapper,
            destination: &self.destination,
            capabilities: self.capabilities,
            class_name,
            source_ids: IdOrder::new(Side::Source),
            destination_ids: IdOrder::new(Side::Destination),
            summary: SyncSummary::default(),
        };

        let mut source_records = self.source.records_ordered_by_id().await?;
        let mut destination_objects = self.destination.objects_ordered_by_id(class_name).await?;

        let mut source_record = source_records.try_next().await?;
        let mut destination_object = destination_objects.try_next().await?;

        while let (Some(record), Some(object)) = (&source_record, &destination_object) {
            let source_id = pass.source_id(record)?;
            let destination_id = pass.destination_id(object)?;

            match destination_id.cmp(&source_id) {
                Ordering::Greater => {
                    pass.insert(record, source_id).await?;
                    source_record = source_records.try_next().await?;
                }
                Ordering::Less => {
                    pass.delete(object, destination_id).await?;
                    destination_object = destination_objects.try_next().await?;
                }
                Ordering::Equal => {
                    pass.update(record, object, source_id).await?;
                    source_record = source_records.try_next().await?;
                    destination_object = destination_objects.try_next().await?;
                }
            }

            pass.notify_progress().await?;
        }

        while let Some(record) = source_record {
            let source_id = pass.source_id(&record)?;
            pass.insert(&record, source_id).await?;
            pass.notify_progress().await?;

            source_record = source_records.try_next().await?;
        }

        while let Some(object) = destination_object {
            let destination_id = pass.destination_id(&object)?;
            pass.delete(&object, destination_id).await?;
            pass.notify_progress().await?;

            destination_object = destination_objects.try_next().await?;
        }

        self.destination.commit().await?;

        Ok(pass.summary)
    }
}

impl<S, M, D> fmt::Debug for Synchronizer<S, M, D>
where
    S: fmt::Debug,
    M: fmt::Debug,
    D: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Synchronizer")
            .field("source", &self.source)
            .field("mapper", &self.mapper)
            .field("destination", &self.destination)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// State of a single synchronization pass.
struct SyncPass<'a, M, D> {
    mapper: &'a M,
    destination: &'a D,
    capabilities: DestinationCapabilities,
    class_name: &'a str,
    source_ids: IdOrder,
    destination_ids: IdOrder,
    summary: SyncSummary,
}

impl<M, D> SyncPass<'_, M, D>
where
    D: DestinationAdapter,
{
    fn source_id<R>(&mut self, record: &R) -> SyncResult<RecordId>
    where
        M: Mapper<R, D::Object>,
    {
        self.source_ids.observe(self.mapper.id_of(record))
    }

    fn destination_id(&mut self, object: &D::Object) -> SyncResult<RecordId> {
        self.destination_ids.observe(self.destination.id_of(object))
    }

    async fn insert<R>(&mut self, record: &R, id: RecordId) -> SyncResult<()>
    where
        M: Mapper<R, D::Object>,
    {
        let object = self.destination.create_object(id, self.class_name).await?;

        let operation = match self.mapper.map(record, object)? {
            MapResult::Changed(object) => {
                self.destination.updated(object).await?;
                debug!(%id, "inserted object");
                Operation::Insert
            }
            MapResult::Unmappable => {
                debug!(%id, "skipped unmappable object");
                Operation::Skip
            }
            MapResult::Unchanged => {
                // The created object is never handed to `updated`, so it is not persisted.
                warn!(%id, "mapper reported no change for a new object, skipping it");
                Operation::Skip
            }
        };

        self.record(operation);

        Ok(())
    }

    async fn update<R>(&mut self, record: &R, object: &D::Object, id: RecordId) -> SyncResult<()>
    where
        M: Mapper<R, D::Object>,
    {
        let target = if self.capabilities.updateable_object_provider {
            self.destination.prepare_update(object).await?
        } else {
            object.clone()
        };

        let operation = match self.mapper.map(record, target)? {
            MapResult::Changed(updated) => {
                self.destination.updated(updated).await?;
                debug!(%id, "updated object");
                Operation::Update
            }
            MapResult::Unchanged => {
                debug!(%id, "kept object");
                Operation::Keep
            }
            MapResult::Unmappable => {
                self.destination.delete(object).await?;
                debug!(%id, "deleted unmappable object");
                Operation::Delete
            }
        };

        self.record(operation);

        Ok(())
    }

    async fn delete(&mut self, object: &D::Object, id: RecordId) -> SyncResult<()> {
        self.destination.delete(object).await?;
        debug!(%id, "deleted object");

        self.record(Operation::Delete);

        Ok(())
    }

    async fn notify_progress(&self) -> SyncResult<()> {
        if self.capabilities.progress_listener {
            self.destination.after_object_processed().await?;
        }

        Ok(())
    }

    fn record(&mut self, operation: Operation) {
        self.summary.record(operation);

        counter!(
            CONTENT_MAPPING_RECORDS_PROCESSED_TOTAL,
            CLASS_NAME_LABEL => self.class_name.to_string(),
            OPERATION_LABEL => operation.as_str(),
            DESTINATION_LABEL => D::name(),
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_order_accepts_equal_and_ascending_ids() {
        let mut order = IdOrder::new(Side::Source);

        assert_eq!(order.observe(RecordId(1)).unwrap(), RecordId(1));
        assert_eq!(order.observe(RecordId(1)).unwrap(), RecordId(1));
        assert_eq!(order.observe(RecordId(5)).unwrap(), RecordId(5));
    }

    #[test]
    fn id_order_rejects_descending_ids_per_side() {
        let mut source = IdOrder::new(Side::Source);
        source.observe(RecordId(2)).unwrap();
        let err = source.observe(RecordId(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceIdsOutOfOrder);
        assert_eq!(err.detail(), Some("id 1 was read after id 2"));

        let mut destination = IdOrder::new(Side::Destination);
        destination.observe(RecordId(2)).unwrap();
        let err = destination.observe(RecordId(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DestinationIdsOutOfOrder);
        assert!(err.is_integrity_violation());
    }

    #[test]
    fn id_zero_is_tracked() {
        let mut order = IdOrder::new(Side::Source);
        order.observe(RecordId(0)).unwrap();

        assert_eq!(order.last_seen, Some(RecordId(0)));
    }

    #[test]
    fn summary_counts_operations() {
        let mut summary = SyncSummary::default();
        for operation in [
            Operation::Insert,
            Operation::Insert,
            Operation::Update,
            Operation::Keep,
            Operation::Delete,
            Operation::Skip,
        ] {
            summary.record(operation);
        }

        assert_eq!(
            summary,
            SyncSummary {
                inserted: 2,
                updated: 1,
                kept: 1,
                deleted: 1,
                skipped: 1,
            }
        );
        assert_eq!(summary.processed(), 6);
        assert!(summary.has_changes());
        assert_eq!(
            summary.to_string(),
            "inserted=2 updated=1 kept=1 deleted=1 skipped=1"
        );
    }

    #[test]
    fn kept_only_summary_has_no_changes() {
        let summary = SyncSummary {
            kept: 3,
            ..SyncSummary::default()
        };

        assert!(!summary.has_changes());
    }
}

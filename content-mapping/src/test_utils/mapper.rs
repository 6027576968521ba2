use std::collections::HashMap;

use crate::error::{ErrorKind, SyncResult};
use crate::mapper::{MapResult, Mapper};
use crate::sync_error;
use crate::test_utils::calls::{Call, CallLog};
use crate::test_utils::records::{TestObject, TestRecord};
use crate::types::RecordId;

/// What [`ScriptedMapper`] returns for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapOutcome {
    /// Changed when forced or when the revisions differ, unchanged otherwise.
    Compare,
    Changed,
    Unchanged,
    Unmappable,
    /// Fails with an [`ErrorKind::MappingError`].
    Fail,
}

/// [`Mapper`] from [`TestRecord`] to [`TestObject`] with per-id scripted outcomes.
///
/// Changed objects carry the record revision. Unscripted ids use [`MapOutcome::Compare`].
#[derive(Debug, Clone)]
pub struct ScriptedMapper {
    outcomes: HashMap<RecordId, MapOutcome>,
    force: bool,
    log: CallLog,
}

impl ScriptedMapper {
    pub fn new(log: &CallLog) -> Self {
        Self {
            outcomes: HashMap::new(),
            force: false,
            log: log.clone(),
        }
    }

    /// Scripts the outcome for the record with `id`.
    pub fn with_outcome(mut self, id: u64, outcome: MapOutcome) -> Self {
        self.outcomes.insert(RecordId(id), outcome);
        self
    }

    pub fn is_forced(&self) -> bool {
        self.force
    }
}

impl Mapper<TestRecord, TestObject> for ScriptedMapper {
    fn id_of(&self, source_record: &TestRecord) -> RecordId {
        source_record.id
    }

    fn set_force(&mut self, force: bool) {
        self.log.push(Call::SetForce(force));
        self.force = force;
    }

    fn map(
        &self,
        source_record: &TestRecord,
        mut destination_object: TestObject,
    ) -> SyncResult<MapResult<TestObject>> {
        self.log.push(Call::Map {
            id: source_record.id,
            target: destination_object.clone(),
        });

        let outcome = self
            .outcomes
            .get(&source_record.id)
            .copied()
            .unwrap_or(MapOutcome::Compare);

        let changed = match outcome {
            MapOutcome::Compare => {
                self.force || destination_object.revision != source_record.revision
            }
            MapOutcome::Changed => true,
            MapOutcome::Unchanged => false,
            MapOutcome::Unmappable => return Ok(MapResult::Unmappable),
            MapOutcome::Fail => {
                return Err(sync_error!(
                    ErrorKind::MappingError,
                    "Injected mapping failure",
                    format!("record {}", source_record.id)
                ));
            }
        };

        if !changed {
            return Ok(MapResult::Unchanged);
        }

        destination_object.revision = source_record.revision;

        Ok(MapResult::Changed(destination_object))
    }
}

use std::sync::{Arc, Mutex, PoisonError};

use crate::test_utils::records::TestObject;
use crate::types::RecordId;

/// A single call made by a synchronizer to one of its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetForce(bool),
    Map { id: RecordId, target: TestObject },
    SourceRecords,
    DestinationObjects { class_name: String },
    CreateObject { id: RecordId, class_name: String },
    PrepareUpdate(TestObject),
    Delete(TestObject),
    Updated(TestObject),
    AfterObjectProcessed,
    Commit,
}

impl Call {
    /// Returns `true` for calls that change the destination.
    pub fn is_write(&self) -> bool {
        matches!(self, Call::Delete(_) | Call::Updated(_))
    }

    /// Returns the id a per-record call refers to.
    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            Call::Map { id, .. } | Call::CreateObject { id, .. } => Some(*id),
            Call::PrepareUpdate(object) | Call::Delete(object) | Call::Updated(object) => {
                Some(object.id)
            }
            Call::SetForce(_)
            | Call::SourceRecords
            | Call::DestinationObjects { .. }
            | Call::AfterObjectProcessed
            | Call::Commit => None,
        }
    }
}

/// Shared, ordered log of [`Call`]s.
///
/// Clones append to the same log.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: Call) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// Returns a snapshot of all calls so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns how many logged calls match `predicate`.
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    /// Returns only the destination writes, in call order.
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(Call::is_write)
            .collect()
    }
}

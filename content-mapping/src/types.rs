use std::fmt;

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::SyncResult;

/// Fallible stream of records produced by a source or destination, ascending by id.
pub type RecordStream<'a, T> = BoxStream<'a, SyncResult<T>>;

/// Identifier of a record, unique within one record class.
///
/// Both the source and the destination sequences are ordered ascending by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn new(id: u64) -> Self {
        RecordId(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

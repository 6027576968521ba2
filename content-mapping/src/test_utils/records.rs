use crate::types::RecordId;

/// Source record with a revision the mapper copies into the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRecord {
    pub id: RecordId,
    pub revision: u32,
}

impl TestRecord {
    pub fn new(id: u64, revision: u32) -> Self {
        Self {
            id: RecordId(id),
            revision,
        }
    }
}

/// Destination object.
///
/// Objects returned from iteration are read-only, objects created or prepared for an update
/// are writable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestObject {
    pub id: RecordId,
    pub class_name: String,
    pub revision: u32,
    pub writable: bool,
}

impl TestObject {
    /// Creates an object as returned by a destination query.
    pub fn stored(id: u64, class_name: &str, revision: u32) -> Self {
        Self {
            id: RecordId(id),
            class_name: class_name.to_string(),
            revision,
            writable: false,
        }
    }

    /// Creates an empty, writable object.
    pub fn created(id: RecordId, class_name: &str) -> Self {
        Self {
            id,
            class_name: class_name.to_string(),
            revision: 0,
            writable: true,
        }
    }

    /// Returns a writable copy of this object.
    pub fn to_writable(&self) -> Self {
        Self {
            writable: true,
            ..self.clone()
        }
    }
}

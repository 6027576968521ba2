//! Mapping of source records into destination objects.

use crate::bail;
use crate::error::{ErrorKind, SyncResult};
use crate::types::RecordId;

/// Outcome of mapping one source record into one destination object.
///
/// The object carried by [`MapResult::Changed`] is not necessarily the object handed to
/// [`Mapper::map`]: a destination whose query results are read-only may have the mapper
/// produce a separate writable instance with the same values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapResult<T> {
    /// Nothing changed, no write is needed.
    Unchanged,
    /// The carried object is new or changed and must be persisted.
    Changed(T),
    /// The source record cannot be represented in the destination.
    ///
    /// A new record must not be inserted and an existing counterpart must be removed.
    Unmappable,
}

impl<T> MapResult<T> {
    pub fn unchanged() -> Self {
        MapResult::Unchanged
    }

    pub fn changed(object: T) -> Self {
        MapResult::Changed(object)
    }

    pub fn unmappable() -> Self {
        MapResult::Unmappable
    }

    /// Builds a [`MapResult::Changed`] from an optional object.
    ///
    /// Mappers that compute the written object through optional lookups use this to turn a
    /// missing object into an [`ErrorKind::InvalidMapResult`] error instead of silently
    /// dropping the write.
    pub fn try_changed(object: Option<T>) -> SyncResult<Self> {
        match object {
            Some(object) => Ok(MapResult::Changed(object)),
            None => bail!(
                ErrorKind::InvalidMapResult,
                "A changed map result must carry an object"
            ),
        }
    }

    /// Returns `true` if the object must be persisted.
    pub fn has_changed(&self) -> bool {
        matches!(self, MapResult::Changed(_))
    }

    pub fn is_unmappable(&self) -> bool {
        matches!(self, MapResult::Unmappable)
    }

    /// Returns the carried object of a [`MapResult::Changed`].
    pub fn object(&self) -> Option<&T> {
        match self {
            MapResult::Changed(object) => Some(object),
            MapResult::Unchanged | MapResult::Unmappable => None,
        }
    }

    pub fn into_object(self) -> Option<T> {
        match self {
            MapResult::Changed(object) => Some(object),
            MapResult::Unchanged | MapResult::Unmappable => None,
        }
    }
}

/// Maps records of a source system into objects of a destination system.
///
/// `S` is the source record type and `O` the writable destination object type.
pub trait Mapper<S, O> {
    /// Returns the id of a record in the source system.
    fn id_of(&self, source_record: &S) -> RecordId;

    /// Sets whether every mapped object must be reported as changed, even when its content is
    /// already up to date.
    fn set_force(&mut self, force: bool);

    /// Copies the content of `source_record` into `destination_object`.
    ///
    /// Returns [`MapResult::Changed`] with the object to persist,
    /// [`MapResult::Unchanged`] when no write is needed, or [`MapResult::Unmappable`] when the
    /// record cannot exist in the destination.
    fn map(&self, source_record: &S, destination_object: O) -> SyncResult<MapResult<O>>;
}

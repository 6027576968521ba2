use std::future::Future;

use crate::error::SyncResult;
use crate::types::{RecordId, RecordStream};

/// Optional capabilities a [`DestinationAdapter`] supports beyond its required operations.
///
/// A synchronizer reads these once when it is constructed and only calls
/// [`DestinationAdapter::prepare_update`] and [`DestinationAdapter::after_object_processed`]
/// when the matching flag is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DestinationCapabilities {
    /// The destination hands out objects that cannot be written directly and provides writable
    /// surrogates through [`DestinationAdapter::prepare_update`].
    pub updateable_object_provider: bool,
    /// The destination wants [`DestinationAdapter::after_object_processed`] after every insert,
    /// update or delete.
    pub progress_listener: bool,
}

impl DestinationCapabilities {
    /// No optional capabilities.
    pub const NONE: DestinationCapabilities = DestinationCapabilities {
        updateable_object_provider: false,
        progress_listener: false,
    };
}

/// Adapter for a destination system (e.g. a search index) that should mirror a source system.
///
/// All operations take `&self`, so implementations use interior mutability for buffered state.
/// Objects are scoped by a record class name, which is passed to iteration and creation.
pub trait DestinationAdapter {
    /// Object type stored in the destination.
    type Object: Clone + Send + Sync;

    /// Returns the name of the destination, used in logs and metrics.
    fn name() -> &'static str;

    /// Returns the optional capabilities of this destination.
    fn capabilities(&self) -> DestinationCapabilities {
        DestinationCapabilities::NONE
    }

    /// Returns a stream over all `class_name` objects, ordered by ascending id.
    fn objects_ordered_by_id(
        &self,
        class_name: &str,
    ) -> impl Future<Output = SyncResult<RecordStream<'_, Self::Object>>> + Send;

    /// Creates a new, empty object identified by `id` and `class_name`.
    ///
    /// The object is not persisted until it is passed to [`DestinationAdapter::updated`].
    fn create_object(
        &self,
        id: RecordId,
        class_name: &str,
    ) -> impl Future<Output = SyncResult<Self::Object>> + Send;

    /// Deletes `object` from the destination.
    fn delete(&self, object: &Self::Object) -> impl Future<Output = SyncResult<()>> + Send;

    /// Registers a new or changed object for persistence.
    ///
    /// Called for objects created by [`DestinationAdapter::create_object`] and for updated
    /// objects, but only when the mapper reported a change.
    fn updated(&self, object: Self::Object) -> impl Future<Output = SyncResult<()>> + Send;

    /// Persists everything registered during the pass.
    ///
    /// Called exactly once at the end of every successful pass, even when nothing changed.
    fn commit(&self) -> impl Future<Output = SyncResult<()>> + Send;

    /// Returns the id of an object in the destination.
    fn id_of(&self, object: &Self::Object) -> RecordId;

    /// Returns a writable object for `object` that the mapper updates.
    ///
    /// Only called when [`DestinationCapabilities::updateable_object_provider`] is set. The
    /// default returns a copy of `object`.
    fn prepare_update(
        &self,
        object: &Self::Object,
    ) -> impl Future<Output = SyncResult<Self::Object>> + Send {
        let object = object.clone();
        async move { Ok(object) }
    }

    /// Called after every single record was inserted, updated, kept or deleted.
    ///
    /// Only called when [`DestinationCapabilities::progress_listener`] is set. The default is
    /// a no-op.
    fn after_object_processed(&self) -> impl Future<Output = SyncResult<()>> + Send {
        async { Ok(()) }
    }
}

use std::collections::HashSet;

use futures::StreamExt;
use futures::stream;

use crate::destination::{DestinationAdapter, DestinationCapabilities};
use crate::error::{ErrorKind, SyncResult};
use crate::sync_error;
use crate::test_utils::calls::{Call, CallLog};
use crate::test_utils::records::TestObject;
use crate::types::{RecordId, RecordStream};

/// Destination operation a failure can be injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestinationOperation {
    ObjectsOrderedById,
    CreateObject,
    Delete,
    Updated,
    Commit,
    PrepareUpdate,
    AfterObjectProcessed,
}

/// Destination that logs every call and persists nothing.
///
/// Iteration yields the configured objects in the given order, which may be out of order.
/// Capabilities default to none.
#[derive(Debug, Clone)]
pub struct RecordingDestination {
    objects: Vec<TestObject>,
    capabilities: DestinationCapabilities,
    failures: HashSet<DestinationOperation>,
    log: CallLog,
}

impl RecordingDestination {
    pub fn new(log: &CallLog, objects: Vec<TestObject>) -> Self {
        Self {
            objects,
            capabilities: DestinationCapabilities::NONE,
            failures: HashSet::new(),
            log: log.clone(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: DestinationCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Makes every call of `operation` fail with an [`ErrorKind::DestinationError`].
    pub fn fail_on(mut self, operation: DestinationOperation) -> Self {
        self.failures.insert(operation);
        self
    }

    fn check(&self, operation: DestinationOperation) -> SyncResult<()> {
        if self.failures.contains(&operation) {
            return Err(sync_error!(
                ErrorKind::DestinationError,
                "Injected destination failure",
                format!("{operation:?}")
            ));
        }

        Ok(())
    }
}

impl DestinationAdapter for RecordingDestination {
    type Object = TestObject;

    fn name() -> &'static str {
        "recording"
    }

    fn capabilities(&self) -> DestinationCapabilities {
        self.capabilities
    }

    async fn objects_ordered_by_id(
        &self,
        class_name: &str,
    ) -> SyncResult<RecordStream<'_, TestObject>> {
        self.log.push(Call::DestinationObjects {
            class_name: class_name.to_string(),
        });
        self.check(DestinationOperation::ObjectsOrderedById)?;

        Ok(stream::iter(self.objects.iter().cloned().map(Ok)).boxed())
    }

    async fn create_object(&self, id: RecordId, class_name: &str) -> SyncResult<TestObject> {
        self.log.push(Call::CreateObject {
            id,
            class_name: class_name.to_string(),
        });
        self.check(DestinationOperation::CreateObject)?;

        Ok(TestObject::created(id, class_name))
    }

    async fn delete(&self, object: &TestObject) -> SyncResult<()> {
        self.log.push(Call::Delete(object.clone()));
        self.check(DestinationOperation::Delete)
    }

    async fn updated(&self, object: TestObject) -> SyncResult<()> {
        self.log.push(Call::Updated(object));
        self.check(DestinationOperation::Updated)
    }

    async fn commit(&self) -> SyncResult<()> {
        self.log.push(Call::Commit);
        self.check(DestinationOperation::Commit)
    }

    fn id_of(&self, object: &TestObject) -> RecordId {
        object.id
    }

    async fn prepare_update(&self, object: &TestObject) -> SyncResult<TestObject> {
        self.log.push(Call::PrepareUpdate(object.clone()));
        self.check(DestinationOperation::PrepareUpdate)?;

        Ok(object.to_writable())
    }

    async fn after_object_processed(&self) -> SyncResult<()> {
        self.log.push(Call::AfterObjectProcessed);
        self.check(DestinationOperation::AfterObjectProcessed)
    }
}

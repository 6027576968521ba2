//! Collaborators for testing synchronization passes.
//!
//! The recording collaborators share a [`CallLog`], so tests can assert on the exact order
//! of mapper and destination calls across a whole pass.

pub mod calls;
pub mod destination;
pub mod mapper;
pub mod records;
pub mod source;

pub use calls::{Call, CallLog};
pub use destination::{DestinationOperation, RecordingDestination};
pub use mapper::{MapOutcome, ScriptedMapper};
pub use records::{TestObject, TestRecord};
pub use source::RecordingSource;

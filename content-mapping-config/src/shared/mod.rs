//! Shared configuration types for synchronization jobs.

mod base;
mod batch;
mod synchronizer;

pub use base::ValidationError;
pub use batch::BatchConfig;
pub use synchronizer::SynchronizerConfig;

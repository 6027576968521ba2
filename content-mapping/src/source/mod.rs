//! Source system abstractions.
//!
//! A [`SourceAdapter`] yields the records that must exist in the destination, ordered
//! ascending by id.

mod base;
pub mod memory;

pub use base::SourceAdapter;

//! Keeps a destination system (e.g. a search index) in sync with a source system (e.g. a
//! relational database) through a merge-diff over two id-ordered sequences.
//!
//! Plug a [`source::SourceAdapter`], a [`mapper::Mapper`] and a
//! [`destination::DestinationAdapter`] into a [`synchronizer::Synchronizer`] and call
//! [`synchronizer::Synchronizer::synchronize`] once per record class.

pub mod destination;
pub mod document;
pub mod error;
mod macros;
pub mod mapper;
pub mod metrics;
pub mod source;
pub mod synchronizer;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;

pub use content_mapping_config::shared::{BatchConfig, SynchronizerConfig};

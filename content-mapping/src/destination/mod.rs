//! Destination system abstractions.
//!
//! This module provides the [`DestinationAdapter`] trait and an in-memory implementation.
//! Destinations yield their current objects for a record class, create new objects, and
//! accept deletes and writes that become durable on [`DestinationAdapter::commit`].

mod base;
pub mod memory;

pub use base::{DestinationAdapter, DestinationCapabilities};

//! Telemetry setup shared by synchronization binaries and tests.

pub mod tracing;

//! Metric names and labels emitted during synchronization.

/// Label for the record class being synchronized.
pub const CLASS_NAME_LABEL: &str = "class_name";

/// Label for the operation applied to a record.
pub const OPERATION_LABEL: &str = "operation";

/// Label for the destination adapter name.
pub const DESTINATION_LABEL: &str = "destination";

/// Counter for records processed, labeled by operation.
pub const CONTENT_MAPPING_RECORDS_PROCESSED_TOTAL: &str =
    "content_mapping_records_processed_total";

/// Counter for synchronization passes that failed.
pub const CONTENT_MAPPING_SYNC_FAILURES_TOTAL: &str = "content_mapping_sync_failures_total";

/// Histogram for the duration of a full synchronization pass.
pub const CONTENT_MAPPING_SYNC_DURATION_SECONDS: &str = "content_mapping_sync_duration_seconds";

/// Counter for buffered writes flushed by in-memory destinations.
pub const CONTENT_MAPPING_FLUSHED_WRITES_TOTAL: &str = "content_mapping_flushed_writes_total";

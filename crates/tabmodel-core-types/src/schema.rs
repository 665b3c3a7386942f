//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_DOCUMENT_ID: &str = "document_id";

// Object identifiers
pub const FIELD_OBJECT_ID: &str = "object_id";
pub const FIELD_OBJECT_KIND: &str = "object_kind";
pub const FIELD_COLLECTION: &str = "collection";

// History
pub const FIELD_BATCH_LABEL: &str = "batch_label";
pub const FIELD_BATCH_OPS: &str = "batch_ops";
pub const FIELD_UNDO_DEPTH: &str = "undo_depth";

// Dependency rebuild
pub const FIELD_EDGE_COUNT: &str = "edge_count";
pub const FIELD_VISITED: &str = "visited";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

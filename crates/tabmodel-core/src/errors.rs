use thiserror::Error;

use crate::model::{ChildKind, ObjectId, ObjectKind};

/// Result type alias using ModelError
pub type Result<T> = std::result::Result<T, ModelError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// This taxonomy provides a stable, structured classification of all errors
/// raised by the engine. Each kind maps to a stable error code that can be
/// used for programmatic error handling, testing, and host-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Lifecycle
    DeletionForbidden,
    NotFound,
    Deleted,

    // Naming
    InvalidName,
    DuplicateName,

    // Contract
    UnsupportedOperation,
    InvalidReference,

    // History
    BatchInProgress,
    NoOpenBatch,
    HistoryCorrupt,

    // Structural
    IntegrityViolation,

    // Ambient
    Configuration,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::DeletionForbidden => "ERR_DELETION_FORBIDDEN",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Deleted => "ERR_DELETED",
            ExErrorKind::InvalidName => "ERR_INVALID_NAME",
            ExErrorKind::DuplicateName => "ERR_DUPLICATE_NAME",
            ExErrorKind::UnsupportedOperation => "ERR_UNSUPPORTED_OPERATION",
            ExErrorKind::InvalidReference => "ERR_INVALID_REFERENCE",
            ExErrorKind::BatchInProgress => "ERR_BATCH_IN_PROGRESS",
            ExErrorKind::NoOpenBatch => "ERR_NO_OPEN_BATCH",
            ExErrorKind::HistoryCorrupt => "ERR_HISTORY_CORRUPT",
            ExErrorKind::IntegrityViolation => "ERR_INTEGRITY_VIOLATION",
            ExErrorKind::Configuration => "ERR_CONFIGURATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether the failure is a user-recoverable validation message rather
    /// than a broken contract
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ExErrorKind::DeletionForbidden
                | ExErrorKind::InvalidName
                | ExErrorKind::DuplicateName
                | ExErrorKind::NotFound
                | ExErrorKind::Deleted
                | ExErrorKind::InvalidReference
        )
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling plus the
/// operation and object context for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    object_id: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            object_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add object ID context
    pub fn with_object_id(mut self, id: impl ToString) -> Self {
        self.object_id = Some(id.to_string());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the object ID context, if any
    pub fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(object_id) = &self.object_id {
            write!(f, " (object_id: {})", object_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for model lifecycle operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    // ===== Lifecycle Errors =====
    /// Governance policy or the object's own hook vetoed the deletion
    #[error("Cannot delete {kind} {object_id}: {reason}")]
    DeletionForbidden {
        object_id: ObjectId,
        kind: ObjectKind,
        reason: String,
    },

    /// No object with this id was ever created in the model
    #[error("Object not found: {object_id}")]
    ObjectNotFound { object_id: ObjectId },

    /// The object exists but is currently detached (deleted)
    #[error("Object was deleted: {object_id}")]
    ObjectDeleted { object_id: ObjectId },

    /// The requested child collection has never been created
    #[error("Collection {child_kind} of object {owner} not found")]
    CollectionNotFound {
        owner: ObjectId,
        child_kind: ChildKind,
    },

    // ===== Naming Errors =====
    /// Name is empty or whitespace-only
    #[error("Invalid name: {reason}")]
    InvalidName { reason: String },

    /// Another sibling in the same collection already uses the name
    #[error("Duplicate name '{name}' in {child_kind} of object {owner}")]
    DuplicateName {
        name: String,
        owner: ObjectId,
        child_kind: ChildKind,
    },

    // ===== Contract Errors =====
    /// The object kind does not support the requested operation (missing
    /// child collection or facet)
    #[error("Unsupported operation '{operation}' on {kind} {object_id}")]
    UnsupportedOperation {
        object_id: ObjectId,
        kind: ObjectKind,
        operation: String,
    },

    /// An operation argument points at an object of the wrong kind
    #[error("Invalid reference from {object_id}: {reason}")]
    InvalidReference { object_id: ObjectId, reason: String },

    // ===== History Errors =====
    /// Undo/redo requested while a batch is still open
    #[error("Cannot replay history while batch '{label}' is open")]
    BatchInProgress { label: String },

    /// end_batch/rollback called without a matching begin_batch
    #[error("No transaction batch is open")]
    NoOpenBatch,

    /// Replay of recorded history failed; the replay was rolled back
    #[error("History replay of '{label}' failed: {message}")]
    HistoryCorrupt { label: String, message: String },

    // ===== Structural Errors =====
    /// A structural invariant does not hold
    #[error("Integrity violation: {message}")]
    IntegrityViolation { message: String },

    // ===== Generic Errors =====
    /// Configuration could not be parsed
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ModelError {
    /// Structured kind of this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            ModelError::DeletionForbidden { .. } => ExErrorKind::DeletionForbidden,
            ModelError::ObjectNotFound { .. } | ModelError::CollectionNotFound { .. } => {
                ExErrorKind::NotFound
            }
            ModelError::ObjectDeleted { .. } => ExErrorKind::Deleted,
            ModelError::InvalidName { .. } => ExErrorKind::InvalidName,
            ModelError::DuplicateName { .. } => ExErrorKind::DuplicateName,
            ModelError::UnsupportedOperation { .. } => ExErrorKind::UnsupportedOperation,
            ModelError::InvalidReference { .. } => ExErrorKind::InvalidReference,
            ModelError::BatchInProgress { .. } => ExErrorKind::BatchInProgress,
            ModelError::NoOpenBatch => ExErrorKind::NoOpenBatch,
            ModelError::HistoryCorrupt { .. } => ExErrorKind::HistoryCorrupt,
            ModelError::IntegrityViolation { .. } => ExErrorKind::IntegrityViolation,
            ModelError::Configuration { .. } => ExErrorKind::Configuration,
            ModelError::Internal { .. } => ExErrorKind::Internal,
        }
    }

    fn object_context(&self) -> Option<ObjectId> {
        match self {
            ModelError::DeletionForbidden { object_id, .. }
            | ModelError::ObjectNotFound { object_id }
            | ModelError::ObjectDeleted { object_id }
            | ModelError::UnsupportedOperation { object_id, .. }
            | ModelError::InvalidReference { object_id, .. } => Some(*object_id),
            ModelError::CollectionNotFound { owner, .. }
            | ModelError::DuplicateName { owner, .. } => Some(*owner),
            _ => None,
        }
    }
}

/// Conversion from ModelError to ExError
impl From<ModelError> for ExError {
    fn from(err: ModelError) -> Self {
        let mut ex = ExError::new(err.kind()).with_message(err.to_string());
        if let Some(id) = err.object_context() {
            ex = ex.with_object_id(id);
        }
        if let ModelError::HistoryCorrupt { label, .. } = &err {
            ex = ex.with_op(label.clone());
        }
        ex
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let kinds = [
            ExErrorKind::DeletionForbidden,
            ExErrorKind::NotFound,
            ExErrorKind::Deleted,
            ExErrorKind::InvalidName,
            ExErrorKind::DuplicateName,
            ExErrorKind::UnsupportedOperation,
            ExErrorKind::InvalidReference,
            ExErrorKind::BatchInProgress,
            ExErrorKind::NoOpenBatch,
            ExErrorKind::HistoryCorrupt,
            ExErrorKind::IntegrityViolation,
            ExErrorKind::Configuration,
            ExErrorKind::Internal,
        ];
        let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_conversion_keeps_object_context() {
        let err = ModelError::DeletionForbidden {
            object_id: ObjectId::new(7),
            kind: ObjectKind::Measure,
            reason: "locked".to_string(),
        };
        let ex: ExError = err.into();
        assert_eq!(ex.kind(), ExErrorKind::DeletionForbidden);
        assert_eq!(ex.code(), "ERR_DELETION_FORBIDDEN");
        assert_eq!(ex.object_id(), Some("#7"));
        assert!(ex.message().contains("locked"));
    }

    #[test]
    fn test_unsupported_operation_is_not_recoverable() {
        assert!(!ExErrorKind::UnsupportedOperation.is_recoverable());
        assert!(ExErrorKind::DuplicateName.is_recoverable());
    }

    #[test]
    fn test_display_includes_code_and_op() {
        let ex = ExError::new(ExErrorKind::HistoryCorrupt)
            .with_op("undo")
            .with_message("boom");
        let text = ex.to_string();
        assert!(text.starts_with("[ERR_HISTORY_CORRUPT]"));
        assert!(text.contains("'undo'"));
        assert!(text.contains("boom"));
    }
}

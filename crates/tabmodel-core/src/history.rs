//! Undo/redo transaction log
//!
//! The log records small reversible operations grouped into named batches.
//! Batches nest: opening a batch while another is open makes it a child of
//! the outer one, and only the outermost batch is committed to the undo
//! stack. Replaying history (undo/redo) lives in [`crate::ops::history_ops`]
//! because it needs the whole model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::{ModelError, Result};
use crate::graph::{TranslatedProperty, TranslationEntry};
use crate::model::{CollectionRef, ObjectId, PropertyName, PropertyValue};

/// One reversible micro-operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op")]
pub enum UndoOperation {
    /// A scalar property changed from `old` to `new`
    PropertyChange {
        object: ObjectId,
        property: PropertyName,
        old: PropertyValue,
        new: PropertyValue,
    },
    /// `object` was inserted into `collection` at `index`
    CollectionAdd {
        collection: CollectionRef,
        object: ObjectId,
        index: usize,
    },
    /// `object` was removed from `collection`, where it sat at `index`
    CollectionRemove {
        collection: CollectionRef,
        object: ObjectId,
        index: usize,
    },
    /// `object` was deleted from `collection`; undo re-materializes it
    ObjectDeleted {
        collection: CollectionRef,
        object: ObjectId,
        index: usize,
    },
    TranslationChange {
        object: ObjectId,
        culture: ObjectId,
        property: TranslatedProperty,
        old: Option<String>,
        new: Option<String>,
    },
    TranslationsCleared {
        object: ObjectId,
        entries: Vec<TranslationEntry>,
    },
    MembershipChange {
        object: ObjectId,
        perspective: ObjectId,
        included: bool,
    },
    PerspectivesCleared {
        object: ObjectId,
        perspectives: Vec<ObjectId>,
    },
    /// Nested batch
    Batch(Batch),
}

impl UndoOperation {
    /// Short label used when an operation is committed outside any batch
    pub fn describe(&self) -> String {
        match self {
            UndoOperation::PropertyChange { property, .. } => format!("Set {}", property),
            UndoOperation::CollectionAdd { collection, .. } => {
                format!("Add {}", collection.child_kind.member_kind())
            }
            UndoOperation::CollectionRemove { collection, .. } => {
                format!("Remove {}", collection.child_kind.member_kind())
            }
            UndoOperation::ObjectDeleted { collection, .. } => {
                format!("Delete {}", collection.child_kind.member_kind())
            }
            UndoOperation::TranslationChange { .. } => "Set Translation".to_string(),
            UndoOperation::TranslationsCleared { .. } => "Clear Translations".to_string(),
            UndoOperation::MembershipChange { .. } => "Set Perspective Membership".to_string(),
            UndoOperation::PerspectivesCleared { .. } => "Clear Perspectives".to_string(),
            UndoOperation::Batch(batch) => batch.label.clone(),
        }
    }

    /// Number of leaf operations, counting through nested batches
    pub fn leaf_count(&self) -> usize {
        match self {
            UndoOperation::Batch(batch) => batch.leaf_count(),
            _ => 1,
        }
    }
}

/// Named, ordered group of operations undone/redone as a unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Batch {
    label: String,
    ops: Vec<UndoOperation>,
    committed_at: Option<DateTime<Utc>>,
}

impl Batch {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ops: Vec::new(),
            committed_at: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn ops(&self) -> &[UndoOperation] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn committed_at(&self) -> Option<DateTime<Utc>> {
        self.committed_at
    }

    pub fn leaf_count(&self) -> usize {
        self.ops.iter().map(UndoOperation::leaf_count).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionLog {
    undo_stack: Vec<Batch>,
    redo_stack: Vec<Batch>,
    open: Vec<Batch>,
    replaying: bool,
    max_depth: usize,
}

impl TransactionLog {
    /// Create a log keeping at most `max_depth` batches (0 = unlimited)
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    /// Open a (possibly nested) batch
    pub fn begin_batch(&mut self, label: impl Into<String>) {
        self.open.push(Batch::new(label));
    }

    /// Close the innermost batch
    ///
    /// A nested batch is appended to its parent; an outermost batch is
    /// committed to the undo stack. Empty batches are discarded.
    ///
    /// # Errors
    ///
    /// Returns `NoOpenBatch` if no batch is open.
    pub fn end_batch(&mut self) -> Result<()> {
        let batch = self.open.pop().ok_or(ModelError::NoOpenBatch)?;
        if batch.is_empty() {
            return Ok(());
        }
        match self.open.last_mut() {
            Some(parent) => parent.ops.push(UndoOperation::Batch(batch)),
            None => self.commit(batch),
        }
        Ok(())
    }

    /// Remove the innermost open batch without committing it
    ///
    /// The caller is responsible for reverting the returned operations.
    ///
    /// # Errors
    ///
    /// Returns `NoOpenBatch` if no batch is open.
    pub fn abort_batch(&mut self) -> Result<Batch> {
        self.open.pop().ok_or(ModelError::NoOpenBatch)
    }

    /// Record an operation
    ///
    /// Ignored while history is being replayed. Outside any batch the
    /// operation is committed on its own.
    pub fn add(&mut self, op: UndoOperation) {
        if self.replaying {
            return;
        }
        match self.open.last_mut() {
            Some(batch) => batch.ops.push(op),
            None => {
                let mut batch = Batch::new(op.describe());
                batch.ops.push(op);
                self.commit(batch);
            }
        }
    }

    fn commit(&mut self, mut batch: Batch) {
        batch.committed_at = Some(Utc::now());
        tracing::debug!(
            batch_label = batch.label(),
            batch_ops = batch.leaf_count(),
            "batch committed"
        );
        self.undo_stack.push(batch);
        self.redo_stack.clear();
        self.trim();
    }

    fn trim(&mut self) {
        if self.max_depth > 0 && self.undo_stack.len() > self.max_depth {
            let excess = self.undo_stack.len() - self.max_depth;
            self.undo_stack.drain(0..excess);
        }
    }

    /// Whether history is currently being replayed
    pub fn is_replaying(&self) -> bool {
        self.replaying
    }

    /// Set the replay flag, returning the previous value
    pub(crate) fn set_replaying(&mut self, replaying: bool) -> bool {
        std::mem::replace(&mut self.replaying, replaying)
    }

    pub fn is_batch_open(&self) -> bool {
        !self.open.is_empty()
    }

    /// Label of the innermost open batch
    pub fn open_label(&self) -> Option<&str> {
        self.open.last().map(Batch::label)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo stack labels, most recent first
    pub fn undo_labels(&self) -> Vec<&str> {
        self.undo_stack.iter().rev().map(Batch::label).collect()
    }

    /// Redo stack labels, next redo first
    pub fn redo_labels(&self) -> Vec<&str> {
        self.redo_stack.iter().rev().map(Batch::label).collect()
    }

    /// Most recently committed batch
    pub fn last_batch(&self) -> Option<&Batch> {
        self.undo_stack.last()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Forget all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub(crate) fn pop_undo(&mut self) -> Option<Batch> {
        self.undo_stack.pop()
    }

    pub(crate) fn push_undo(&mut self, batch: Batch) {
        self.undo_stack.push(batch);
    }

    pub(crate) fn pop_redo(&mut self) -> Option<Batch> {
        self.redo_stack.pop()
    }

    pub(crate) fn push_redo(&mut self, batch: Batch) {
        self.redo_stack.push(batch);
    }
}

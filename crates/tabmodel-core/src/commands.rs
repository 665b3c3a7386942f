//! Command types representing every model operation
//!
//! Commands are processed by [`crate::apply::apply`], the single entry point
//! that wraps each operation with structured start/end logging.

use crate::graph::TranslatedProperty;
use crate::model::ObjectId;
use crate::ops::{DeleteOutcome, RebuildReport, RenameOutcome};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateTable {
        name: String,
    },
    /// Create a column; an expression makes it calculated
    CreateColumn {
        table: ObjectId,
        name: String,
        expression: Option<String>,
    },
    CreateMeasure {
        table: ObjectId,
        name: String,
        expression: String,
    },
    CreateHierarchy {
        table: ObjectId,
        name: String,
    },
    CreateLevel {
        hierarchy: ObjectId,
        name: String,
        column: ObjectId,
    },
    CreatePerspective {
        name: String,
    },
    CreateCulture {
        name: String,
    },

    /// Delete an object and everything it owns (policy-gated)
    Delete {
        object: ObjectId,
    },
    Rename {
        object: ObjectId,
        name: String,
    },
    SetExpression {
        object: ObjectId,
        expression: Option<String>,
    },
    SetTranslation {
        object: ObjectId,
        culture: ObjectId,
        property: TranslatedProperty,
        value: Option<String>,
    },
    SetPerspectiveMembership {
        object: ObjectId,
        perspective: ObjectId,
        included: bool,
    },

    Undo,
    Redo,
    /// Recompute every dependency edge from formula text
    RebuildDependencies,
}

impl Command {
    /// Operation name used in structured logs
    pub fn op_name(&self) -> &'static str {
        match self {
            Command::CreateTable { .. } => "create_table",
            Command::CreateColumn { .. } => "create_column",
            Command::CreateMeasure { .. } => "create_measure",
            Command::CreateHierarchy { .. } => "create_hierarchy",
            Command::CreateLevel { .. } => "create_level",
            Command::CreatePerspective { .. } => "create_perspective",
            Command::CreateCulture { .. } => "create_culture",
            Command::Delete { .. } => "delete_object",
            Command::Rename { .. } => "rename_object",
            Command::SetExpression { .. } => "set_expression",
            Command::SetTranslation { .. } => "set_translation",
            Command::SetPerspectiveMembership { .. } => "set_perspective_membership",
            Command::Undo => "undo",
            Command::Redo => "redo",
            Command::RebuildDependencies => "rebuild_dependencies",
        }
    }

    /// Object the command targets, if any
    pub fn target(&self) -> Option<ObjectId> {
        match self {
            Command::CreateColumn { table, .. }
            | Command::CreateMeasure { table, .. }
            | Command::CreateHierarchy { table, .. } => Some(*table),
            Command::CreateLevel { hierarchy, .. } => Some(*hierarchy),
            Command::Delete { object }
            | Command::Rename { object, .. }
            | Command::SetExpression { object, .. }
            | Command::SetTranslation { object, .. }
            | Command::SetPerspectiveMembership { object, .. } => Some(*object),
            Command::CreateTable { .. }
            | Command::CreatePerspective { .. }
            | Command::CreateCulture { .. }
            | Command::Undo
            | Command::Redo
            | Command::RebuildDependencies => None,
        }
    }
}

/// What a successfully applied command did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Created(ObjectId),
    Deleted(DeleteOutcome),
    Renamed(RenameOutcome),
    /// A property, translation or membership write; `changed` is false for
    /// no-ops and vetoes
    Updated { changed: bool },
    /// Label of the batch undone/redone, `None` if the stack was empty
    Replayed(Option<String>),
    Rebuilt(RebuildReport),
}

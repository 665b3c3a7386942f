//! Command apply function
//!
//! `apply()` is the canonical entry point for host-driven mutations. Each
//! command runs through exactly one operation and is bracketed by
//! `log_op_start!` / `log_op_end!` (or `log_op_error!`).
//!
//! ## Atomicity Contract
//!
//! - **All-or-nothing**: a failed command leaves the model as it was; the
//!   operations roll back their own open batch on failure
//! - **No panics**: invalid input returns typed errors
//!
//! ## Example
//!
//! ```
//! use tabmodel_core::{apply, Command, CommandOutcome, Model};
//!
//! let mut model = Model::new();
//! let outcome = apply(&mut model, Command::CreateTable { name: "Sales".to_string() }).unwrap();
//! assert!(matches!(outcome, CommandOutcome::Created(_)));
//! ```

use std::time::Instant;

use crate::commands::{Command, CommandOutcome};
use crate::errors::Result;
use crate::ops::{
    create_ops, dependency_ops, history_ops, lifecycle_ops, property_ops, reference_ops, Model,
};
use crate::{log_op_end, log_op_error, log_op_start};

/// Apply a command to the model
///
/// # Errors
///
/// Returns whatever the underlying operation returns. See
/// [`crate::errors::ModelError`] for the taxonomy.
pub fn apply(model: &mut Model, cmd: Command) -> Result<CommandOutcome> {
    let op = cmd.op_name();
    let target = cmd.target().map(|id| id.to_string()).unwrap_or_default();
    log_op_start!(op, object_id = %target, document_id = %model.document_id());
    let started = Instant::now();

    let result = dispatch(model, cmd);

    let duration_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => {
            log_op_end!(op, duration_ms = duration_ms);
        }
        Err(err) => {
            log_op_error!(op, err.clone(), duration_ms = duration_ms);
        }
    }
    result
}

fn dispatch(model: &mut Model, cmd: Command) -> Result<CommandOutcome> {
    match cmd {
        Command::CreateTable { name } => {
            create_ops::create_table(model, &name).map(CommandOutcome::Created)
        }
        Command::CreateColumn {
            table,
            name,
            expression,
        } => create_ops::create_column(model, table, &name, expression.as_deref())
            .map(CommandOutcome::Created),
        Command::CreateMeasure {
            table,
            name,
            expression,
        } => create_ops::create_measure(model, table, &name, &expression)
            .map(CommandOutcome::Created),
        Command::CreateHierarchy { table, name } => {
            create_ops::create_hierarchy(model, table, &name).map(CommandOutcome::Created)
        }
        Command::CreateLevel {
            hierarchy,
            name,
            column,
        } => create_ops::create_level(model, hierarchy, &name, column).map(CommandOutcome::Created),
        Command::CreatePerspective { name } => {
            create_ops::create_perspective(model, &name).map(CommandOutcome::Created)
        }
        Command::CreateCulture { name } => {
            create_ops::create_culture(model, &name).map(CommandOutcome::Created)
        }

        Command::Delete { object } => {
            lifecycle_ops::delete_object(model, object).map(CommandOutcome::Deleted)
        }
        Command::Rename { object, name } => {
            lifecycle_ops::rename_object(model, object, &name).map(CommandOutcome::Renamed)
        }
        Command::SetExpression { object, expression } => {
            property_ops::set_expression(model, object, expression.as_deref())
                .map(|changed| CommandOutcome::Updated { changed })
        }
        Command::SetTranslation {
            object,
            culture,
            property,
            value,
        } => reference_ops::set_translation(model, object, culture, property, value)
            .map(|changed| CommandOutcome::Updated { changed }),
        Command::SetPerspectiveMembership {
            object,
            perspective,
            included,
        } => reference_ops::set_perspective_membership(model, object, perspective, included)
            .map(|changed| CommandOutcome::Updated { changed }),

        Command::Undo => history_ops::undo(model).map(CommandOutcome::Replayed),
        Command::Redo => history_ops::redo(model).map(CommandOutcome::Replayed),
        Command::RebuildDependencies => Ok(CommandOutcome::Rebuilt(
            dependency_ops::rebuild_dependencies(model),
        )),
    }
}

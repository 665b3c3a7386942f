//! Object creation
//!
//! Each create runs inside an "Add <Kind>" batch, validates the name against
//! its future siblings, materializes a fresh entity and logs an undoable
//! `CollectionAdd`.

use crate::errors::{ModelError, Result};
use crate::history::UndoOperation;
use crate::model::{ChildKind, CollectionRef, Facet, ObjectHandle, ObjectId, ObjectKind};

use super::collection_ops::attach;
use super::dependency_ops::refresh_dependencies;
use super::history_ops::in_batch;
use super::Model;

/// Reject empty/whitespace names and names with surrounding whitespace
pub(crate) fn validate_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ModelError::InvalidName {
            reason: "Name cannot be empty or whitespace-only".to_string(),
        });
    }
    if trimmed.len() != name.len() {
        return Err(ModelError::InvalidName {
            reason: format!("Name '{}' has leading or trailing whitespace", name),
        });
    }
    Ok(())
}

fn create_child(
    model: &mut Model,
    owner: ObjectId,
    child_kind: ChildKind,
    name: &str,
    configure: impl FnOnce(&mut ObjectHandle),
) -> Result<ObjectId> {
    model.get_live(owner)?;
    let collection = model.child_collection(owner, child_kind)?;
    validate_name(name)?;
    if collection.is_name_taken(name, None) {
        return Err(ModelError::DuplicateName {
            name: name.to_string(),
            owner,
            child_kind,
        });
    }

    let key = CollectionRef::new(owner, child_kind);
    let index = collection.len();
    let kind = child_kind.member_kind();

    in_batch(model, format!("Add {}", kind), |model| {
        let id = model.alloc_handle(kind, name);
        configure(model.handle_mut(id)?);
        model.materialize(id);
        let index = attach(model, id, key, index)?;
        model.log.add(UndoOperation::CollectionAdd {
            collection: key,
            object: id,
            index,
        });
        tracing::debug!(object_id = %id, object_kind = %kind, collection = %key, "created");
        Ok(id)
    })
}

/// Add a table to the model
///
/// # Errors
///
/// * `InvalidName` - name is empty or whitespace-only
/// * `DuplicateName` - another table already uses the name
pub fn create_table(model: &mut Model, name: &str) -> Result<ObjectId> {
    let root = model.root();
    create_child(model, root, ChildKind::Tables, name, |_| {})
}

/// Add a column to `table`; an expression makes it a calculated column
///
/// # Errors
///
/// * `ObjectDeleted` / `ObjectNotFound` - `table` is not live
/// * `UnsupportedOperation` - `table` is not a table
/// * `InvalidName` / `DuplicateName` - name validation failed
pub fn create_column(
    model: &mut Model,
    table: ObjectId,
    name: &str,
    expression: Option<&str>,
) -> Result<ObjectId> {
    let expression = expression.map(str::to_string);
    let calculated = expression.is_some();
    let id = create_child(model, table, ChildKind::Columns, name, |handle| {
        if let Some(expression) = expression {
            handle.facets = handle.facets.with(Facet::FormulaBearing);
            handle.expression = Some(expression);
        }
    })?;
    if calculated {
        refresh_dependencies(model, id)?;
    }
    Ok(id)
}

/// Add a measure to `table`
///
/// # Errors
///
/// Same as [`create_column`].
pub fn create_measure(
    model: &mut Model,
    table: ObjectId,
    name: &str,
    expression: &str,
) -> Result<ObjectId> {
    let id = create_child(model, table, ChildKind::Measures, name, |handle| {
        handle.expression = Some(expression.to_string());
    })?;
    refresh_dependencies(model, id)?;
    Ok(id)
}

/// Add a hierarchy to `table`
///
/// # Errors
///
/// Same as [`create_column`].
pub fn create_hierarchy(model: &mut Model, table: ObjectId, name: &str) -> Result<ObjectId> {
    create_child(model, table, ChildKind::Hierarchies, name, |_| {})
}

/// Append a level built on `column` to `hierarchy`
///
/// The level's ordinal is its position in the hierarchy.
///
/// # Errors
///
/// * `InvalidReference` - `column` is not a live column of the hierarchy's table
/// * plus everything [`create_column`] can return
pub fn create_level(
    model: &mut Model,
    hierarchy: ObjectId,
    name: &str,
    column: ObjectId,
) -> Result<ObjectId> {
    let source = model.get_live(column)?;
    if source.kind() != ObjectKind::Column {
        return Err(ModelError::InvalidReference {
            object_id: hierarchy,
            reason: format!("level source {} is a {}, not a column", column, source.kind()),
        });
    }
    if model.owning_table(column) != model.owning_table(hierarchy) {
        return Err(ModelError::InvalidReference {
            object_id: hierarchy,
            reason: format!("column {} belongs to another table", column),
        });
    }

    let ordinal = model.child_collection(hierarchy, ChildKind::Levels)?.len() as u32;
    create_child(model, hierarchy, ChildKind::Levels, name, |handle| {
        handle.ordinal = Some(ordinal);
        handle.source_column = Some(column);
    })
}

/// Add a perspective to the model
///
/// # Errors
///
/// * `InvalidName` / `DuplicateName` - name validation failed
pub fn create_perspective(model: &mut Model, name: &str) -> Result<ObjectId> {
    let root = model.root();
    create_child(model, root, ChildKind::Perspectives, name, |_| {})
}

/// Add a culture (translation locale) to the model
///
/// # Errors
///
/// * `InvalidName` / `DuplicateName` - name validation failed
pub fn create_culture(model: &mut Model, name: &str) -> Result<ObjectId> {
    let root = model.root();
    create_child(model, root, ChildKind::Cultures, name, |_| {})
}

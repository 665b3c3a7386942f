//! Undo, redo and rollback
//!
//! Replay walks the leaf operations of a batch (nested batches are
//! flattened in recording order): undo reverts them last to first, redo
//! re-applies them first to last. The log's replay flag is raised for the
//! duration so nothing the replay touches is recorded again, and permission
//! checks are skipped. A replay that fails part way is wound back to where it
//! started and reported as `HistoryCorrupt`.

use crate::errors::{ModelError, Result};
use crate::history::{Batch, UndoOperation};
use crate::model::{CollectionRef, ObjectId};
use crate::notify::ChangeEvent;

use super::collection_ops::detach;
use super::lifecycle_ops::{release_subtree, undelete_object};
use super::property_ops::write_property;
use super::Model;

/// Run `body` inside a named batch
///
/// On success the batch is closed (and committed if outermost). On failure
/// every operation recorded in the batch so far is reverted before the error
/// is returned.
pub(crate) fn in_batch<T>(
    model: &mut Model,
    label: impl Into<String>,
    body: impl FnOnce(&mut Model) -> Result<T>,
) -> Result<T> {
    model.log.begin_batch(label);
    match body(model) {
        Ok(value) => {
            model.log.end_batch()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = rollback(model) {
                tracing::error!(error = %rollback_err, "rollback after failed batch was incomplete");
            }
            Err(err)
        }
    }
}

/// Abort the innermost open batch and revert what it recorded
///
/// Returns the number of operations reverted. Rollback is best effort: it
/// keeps going past individual failures and reports the first one.
///
/// # Errors
///
/// * `NoOpenBatch` - no batch is open
/// * `HistoryCorrupt` - some operation could not be reverted
pub fn rollback(model: &mut Model) -> Result<usize> {
    let batch = model.log.abort_batch()?;
    let leaves = leaf_ops(batch.ops());

    let previous = model.log.set_replaying(true);
    let mut reverted = 0;
    let mut first_error = None;
    for op in leaves.iter().rev() {
        match revert(model, op) {
            Ok(()) => reverted += 1,
            Err(err) => {
                tracing::error!(error = %err, operation = %op.describe(), "rollback step failed");
                first_error.get_or_insert(err);
            }
        }
    }
    model.log.set_replaying(previous);

    tracing::debug!(batch_label = batch.label(), batch_ops = reverted, "batch rolled back");
    match first_error {
        Some(err) => Err(ModelError::HistoryCorrupt {
            label: batch.label().to_string(),
            message: err.to_string(),
        }),
        None => Ok(reverted),
    }
}

/// Undo the most recent batch; returns its label, or `None` if there is
/// nothing to undo
///
/// # Errors
///
/// * `BatchInProgress` - a batch is open
/// * `HistoryCorrupt` - replay failed; the model is back where it was
pub fn undo(model: &mut Model) -> Result<Option<String>> {
    ensure_no_open_batch(model)?;
    let Some(batch) = model.log.pop_undo() else {
        return Ok(None);
    };
    let label = batch.label().to_string();

    let previous = model.log.set_replaying(true);
    let result = revert_all(model, &batch);
    model.log.set_replaying(previous);

    match result {
        Ok(()) => {
            tracing::debug!(batch_label = %label, undo_depth = model.log.undo_depth(), "undo");
            model.log.push_redo(batch);
            Ok(Some(label))
        }
        Err(err) => {
            tracing::error!(batch_label = %label, error = %err, "undo failed");
            model.log.push_undo(batch);
            Err(ModelError::HistoryCorrupt {
                label,
                message: err.to_string(),
            })
        }
    }
}

/// Redo the most recently undone batch; returns its label, or `None` if
/// there is nothing to redo
///
/// # Errors
///
/// * `BatchInProgress` - a batch is open
/// * `HistoryCorrupt` - replay failed; the model is back where it was
pub fn redo(model: &mut Model) -> Result<Option<String>> {
    ensure_no_open_batch(model)?;
    let Some(batch) = model.log.pop_redo() else {
        return Ok(None);
    };
    let label = batch.label().to_string();

    let previous = model.log.set_replaying(true);
    let result = replay_all(model, &batch);
    model.log.set_replaying(previous);

    match result {
        Ok(()) => {
            tracing::debug!(batch_label = %label, undo_depth = model.log.undo_depth() + 1, "redo");
            model.log.push_undo(batch);
            Ok(Some(label))
        }
        Err(err) => {
            tracing::error!(batch_label = %label, error = %err, "redo failed");
            model.log.push_redo(batch);
            Err(ModelError::HistoryCorrupt {
                label,
                message: err.to_string(),
            })
        }
    }
}

fn ensure_no_open_batch(model: &Model) -> Result<()> {
    match model.log.open_label() {
        Some(label) => Err(ModelError::BatchInProgress {
            label: label.to_string(),
        }),
        None => Ok(()),
    }
}

/// Leaf operations in recording order
fn leaf_ops(ops: &[UndoOperation]) -> Vec<&UndoOperation> {
    let mut leaves = Vec::new();
    for op in ops {
        match op {
            UndoOperation::Batch(batch) => leaves.extend(leaf_ops(batch.ops())),
            leaf => leaves.push(leaf),
        }
    }
    leaves
}

fn revert_all(model: &mut Model, batch: &Batch) -> Result<()> {
    let leaves = leaf_ops(batch.ops());
    for (done, op) in leaves.iter().rev().enumerate() {
        if let Err(err) = revert(model, op) {
            for undone in &leaves[leaves.len() - done..] {
                if let Err(restore_err) = replay(model, undone) {
                    tracing::error!(error = %restore_err, "could not restore after failed undo");
                }
            }
            return Err(err);
        }
    }
    Ok(())
}

fn replay_all(model: &mut Model, batch: &Batch) -> Result<()> {
    let leaves = leaf_ops(batch.ops());
    for (done, op) in leaves.iter().enumerate() {
        if let Err(err) = replay(model, op) {
            for redone in leaves[..done].iter().rev() {
                if let Err(restore_err) = revert(model, redone) {
                    tracing::error!(error = %restore_err, "could not restore after failed redo");
                }
            }
            return Err(err);
        }
    }
    Ok(())
}

/// Take a created object back out of the tree
fn withdraw(model: &mut Model, id: ObjectId, collection: CollectionRef) -> Result<()> {
    if model.get(id)?.collection() == Some(collection) {
        detach(model, id)?;
    }
    release_subtree(model, id);
    Ok(())
}

fn revert(model: &mut Model, op: &UndoOperation) -> Result<()> {
    match op {
        UndoOperation::PropertyChange {
            object,
            property,
            old,
            ..
        } => write_property(model, *object, *property, old),
        UndoOperation::CollectionAdd {
            collection, object, ..
        } => withdraw(model, *object, *collection),
        UndoOperation::CollectionRemove {
            collection,
            object,
            index,
        }
        | UndoOperation::ObjectDeleted {
            collection,
            object,
            index,
        } => undelete_object(model, *object, *collection, *index),
        UndoOperation::TranslationChange {
            object,
            culture,
            property,
            old,
            ..
        } => {
            model
                .graph
                .set_translation(*object, *culture, *property, old.clone());
            Ok(())
        }
        UndoOperation::TranslationsCleared { object, entries } => {
            for entry in entries {
                model.graph.set_translation(
                    *object,
                    entry.culture,
                    entry.property,
                    Some(entry.value.clone()),
                );
            }
            Ok(())
        }
        UndoOperation::MembershipChange {
            object,
            perspective,
            included,
        } => {
            model.graph.set_membership(*object, *perspective, !included);
            Ok(())
        }
        UndoOperation::PerspectivesCleared {
            object,
            perspectives,
        } => {
            for perspective in perspectives {
                model.graph.set_membership(*object, *perspective, true);
            }
            Ok(())
        }
        UndoOperation::Batch(_) => Ok(()),
    }
}

fn replay(model: &mut Model, op: &UndoOperation) -> Result<()> {
    match op {
        UndoOperation::PropertyChange {
            object,
            property,
            new,
            ..
        } => write_property(model, *object, *property, new),
        UndoOperation::CollectionAdd {
            collection,
            object,
            index,
        } => undelete_object(model, *object, *collection, *index),
        UndoOperation::CollectionRemove {
            collection, object, ..
        } => {
            if model.get(*object)?.collection() == Some(*collection) {
                detach(model, *object)?;
            }
            Ok(())
        }
        UndoOperation::ObjectDeleted { object, .. } => {
            let kind = model.get(*object)?.kind();
            if model.get(*object)?.is_attached() {
                detach(model, *object)?;
            }
            release_subtree(model, *object);
            model.notifier.publish(ChangeEvent::ObjectDeleted {
                object: *object,
                kind,
            });
            Ok(())
        }
        UndoOperation::TranslationChange {
            object,
            culture,
            property,
            new,
            ..
        } => {
            model
                .graph
                .set_translation(*object, *culture, *property, new.clone());
            Ok(())
        }
        UndoOperation::TranslationsCleared { object, .. } => {
            model.graph.clear_translations(*object);
            Ok(())
        }
        UndoOperation::MembershipChange {
            object,
            perspective,
            included,
        } => {
            model.graph.set_membership(*object, *perspective, *included);
            Ok(())
        }
        UndoOperation::PerspectivesCleared { object, .. } => {
            model.graph.clear_perspectives(*object);
            Ok(())
        }
        UndoOperation::Batch(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChildKind;
    use crate::ops::{create_ops, lifecycle_ops};

    #[test]
    fn test_leaf_ops_flattens_in_order() {
        let mut model = Model::new();
        model.begin_batch("Outer");
        create_ops::create_culture(&mut model, "a").unwrap();
        create_ops::create_culture(&mut model, "b").unwrap();
        model.end_batch().unwrap();

        let batch = model.history().last_batch().unwrap();
        assert_eq!(batch.ops().len(), 2);
        let leaves = leaf_ops(batch.ops());
        assert_eq!(leaves.len(), 2);
        assert!(matches!(leaves[0], UndoOperation::CollectionAdd { .. }));
    }

    #[test]
    fn test_undo_redo_create() {
        let mut model = Model::new();
        let table = create_ops::create_table(&mut model, "Sales").unwrap();

        assert_eq!(undo(&mut model).unwrap().as_deref(), Some("Add Table"));
        assert!(!model.is_live(table));
        assert!(model.get(table).unwrap().entity().is_none());
        assert!(model.history().can_redo());

        assert_eq!(redo(&mut model).unwrap().as_deref(), Some("Add Table"));
        assert!(model.is_live(table));
        assert_eq!(model.find_table("Sales"), Some(table));
        assert!(!model.history().can_redo());
    }

    #[test]
    fn test_undo_with_open_batch_fails() {
        let mut model = Model::new();
        create_ops::create_table(&mut model, "Sales").unwrap();
        model.begin_batch("Edit");
        assert_eq!(
            undo(&mut model),
            Err(ModelError::BatchInProgress {
                label: "Edit".to_string()
            })
        );
    }

    #[test]
    fn test_empty_history() {
        let mut model = Model::new();
        assert_eq!(undo(&mut model).unwrap(), None);
        assert_eq!(redo(&mut model).unwrap(), None);
    }

    #[test]
    fn test_rollback_reverts_open_batch() {
        let mut model = Model::new();
        let key = CollectionRef::new(model.root(), ChildKind::Tables);
        model.begin_batch("Scratch");
        create_ops::create_table(&mut model, "A").unwrap();
        create_ops::create_table(&mut model, "B").unwrap();

        assert_eq!(rollback(&mut model).unwrap(), 2);
        assert!(model.collection(key).unwrap().is_empty());
        assert!(!model.history().is_batch_open());
        assert!(!model.history().can_undo());
    }

    #[test]
    fn test_undo_of_delete_restores_descendants() {
        let mut model = Model::new();
        let table = create_ops::create_table(&mut model, "Sales").unwrap();
        let column = create_ops::create_column(&mut model, table, "Amount", None).unwrap();

        lifecycle_ops::delete_object(&mut model, table).unwrap();
        assert!(!model.is_live(column));

        undo(&mut model).unwrap();
        assert!(model.is_live(column));
        assert!(model.get(column).unwrap().entity().is_some());
        assert_eq!(model.metadata_index(column), Some(0));
    }

    #[test]
    fn test_failed_undo_winds_back_and_reports_corruption() {
        let mut model = Model::new();
        let tables = CollectionRef::new(model.root(), ChildKind::Tables);
        model.begin_batch("Pair");
        let table = create_ops::create_table(&mut model, "T").unwrap();
        let perspective = create_ops::create_perspective(&mut model, "P").unwrap();
        model.end_batch().unwrap();

        // the table's collection vanishes behind the log's back
        model.collections.remove(&tables);

        let result = undo(&mut model);

        assert!(matches!(
            result,
            Err(ModelError::HistoryCorrupt { ref label, .. }) if label == "Pair"
        ));
        assert!(model.is_live(perspective));
        assert!(model.get(table).unwrap().is_attached());
        assert_eq!(model.history().undo_labels(), vec!["Pair"]);
        assert!(!model.history().can_redo());
        assert!(!model.history().is_replaying());
    }
}

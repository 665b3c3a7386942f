//! Delete, undelete and rename
//!
//! Delete is the cascading operation: it tears down the references of the
//! whole subtree (children first), removes the object from its collection,
//! runs post-removal hooks and drops the subtree's entity tokens, all inside
//! one "Delete <Kind>" batch. Any failure after the batch opens rolls the
//! batch back, so a delete either fully happens or leaves no trace.

use crate::behavior::{behavior_for, DeleteVerdict};
use crate::errors::{ModelError, Result};
use crate::history::UndoOperation;
use crate::model::{CollectionRef, ObjectId, PropertyName, PropertyValue};
use crate::notify::ChangeEvent;

use super::collection_ops::{attach, remove_from_collection};
use super::create_ops::validate_name;
use super::history_ops::in_batch;
use super::reference_ops::sever_references;
use super::Model;

/// Result of a delete request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The object was deleted; `advisory` carries the object's own warning
    Deleted { advisory: Option<String> },
    /// A listener cancelled the delete; nothing changed
    Cancelled,
}

/// Result of a rename request that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed,
    /// The new name equals the current one; nothing was recorded
    Unchanged,
    /// A listener vetoed the rename; nothing changed
    Vetoed,
}

/// Ask governance, then the object's own hook, whether `id` may be deleted
///
/// # Errors
///
/// Returns `ObjectNotFound` / `ObjectDeleted` if `id` is not live.
pub fn can_delete(model: &Model, id: ObjectId) -> Result<DeleteVerdict> {
    let kind = model.get_live(id)?.kind();
    if !model.governance.allow_delete(kind) {
        return Ok(DeleteVerdict::Forbidden {
            reason: model.governance.denial_reason(kind),
        });
    }
    Ok(behavior_for(kind).allow_delete(model, id))
}

/// Delete `id` and everything it owns
///
/// Permission checks are skipped while history is being replayed.
///
/// # Errors
///
/// * `DeletionForbidden` - governance or the object's hook vetoed; no mutation
/// * `ObjectNotFound` / `ObjectDeleted` - `id` is not live
/// * any error from the cascade, after the open batch was rolled back
pub fn delete_object(model: &mut Model, id: ObjectId) -> Result<DeleteOutcome> {
    let kind = model.get_live(id)?.kind();

    let mut advisory = None;
    if !model.log.is_replaying() {
        match can_delete(model, id)? {
            DeleteVerdict::Forbidden { reason } => {
                tracing::debug!(object_id = %id, object_kind = %kind, %reason, "delete forbidden");
                return Err(ModelError::DeletionForbidden {
                    object_id: id,
                    kind,
                    reason,
                });
            }
            DeleteVerdict::Allowed { advisory: message } => advisory = message,
        }
    }

    if model.notifier.object_deleting(id, kind) {
        tracing::debug!(object_id = %id, object_kind = %kind, "delete cancelled by listener");
        return Ok(DeleteOutcome::Cancelled);
    }

    in_batch(model, format!("Delete {}", kind), |model| cascade_delete(model, id))?;

    model
        .notifier
        .publish(ChangeEvent::ObjectDeleted { object: id, kind });
    Ok(DeleteOutcome::Deleted { advisory })
}

fn cascade_delete(model: &mut Model, id: ObjectId) -> Result<()> {
    // Snapshots: hooks below mutate the collections being walked.
    let postorder = model.descendants_postorder(id);
    let mut top_down = vec![id];
    top_down.extend(model.descendants(id));

    for child in postorder.iter().copied().chain(std::iter::once(id)) {
        let kind = model.get(child)?.kind();
        behavior_for(kind).before_delete(model, child)?;
        sever_references(model, child);
    }

    let originals = top_down
        .iter()
        .map(|member| Ok((*member, model.get(*member)?.collection())))
        .collect::<Result<Vec<_>>>()?;

    let (key, index) = remove_from_collection(model, id)?;

    for (member, original) in originals {
        let kind = model.get(member)?.kind();
        behavior_for(kind).after_removal(model, member, original)?;
    }

    release_subtree(model, id);
    model.log.add(UndoOperation::ObjectDeleted {
        collection: key,
        object: id,
        index,
    });
    tracing::debug!(
        object_id = %id,
        collection = %key,
        index,
        descendants = postorder.len(),
        "subtree deleted"
    );
    Ok(())
}

/// Detach the descendants of an already-removed `id`, drop the subtree's
/// entity tokens and any dependency edges still touching it
pub(crate) fn release_subtree(model: &mut Model, id: ObjectId) {
    let descendants = model.descendants(id);
    for member in descendants.iter().copied() {
        if let Ok(handle) = model.handle_mut(member) {
            handle.collection = None;
        }
    }
    for member in std::iter::once(id).chain(descendants) {
        model.dematerialize(member);
        model.graph.sever_dependencies(member);
    }
}

/// Bring a deleted object back into `collection` at `index`
///
/// Re-materializes the entity, resolves `collection` against the live model,
/// re-inserts the handle if it is not already there and restores the
/// objects it owns. Reference edges are not restored; run a dependency
/// rebuild afterwards. Calling it on an already restored object is a no-op.
///
/// # Errors
///
/// * `ObjectNotFound` - `id` was never allocated
/// * `ObjectDeleted` - the collection's owner is not live
/// * `DuplicateName` - a sibling took the object's name in the meantime
pub fn undelete_object(
    model: &mut Model,
    id: ObjectId,
    collection: CollectionRef,
    index: usize,
) -> Result<()> {
    let kind = model.get(id)?.kind();
    if !model.is_live(collection.owner) {
        return Err(ModelError::ObjectDeleted {
            object_id: collection.owner,
        });
    }
    let in_place = model.get(id)?.collection() == Some(collection)
        && model.collection(collection)?.contains(id);
    if in_place && model.get(id)?.entity().is_some() {
        return Ok(());
    }

    let name = model.get(id)?.name().to_string();
    let target = model.collection(collection)?;
    if !target.contains(id) && target.is_name_taken(&name, Some(id)) {
        return Err(ModelError::DuplicateName {
            name,
            owner: collection.owner,
            child_kind: collection.child_kind,
        });
    }

    if model.get(id)?.entity().is_none() {
        model.materialize(id);
    }
    attach(model, id, collection, index)?;
    behavior_for(kind).restore_owned(model, id)?;

    tracing::debug!(object_id = %id, object_kind = %kind, collection = %collection, "undeleted");
    Ok(())
}

/// Rename `id`
///
/// Order: validate, ask listeners (cancellable), check sibling uniqueness
/// and write, log the undo record, update the name index, publish.
///
/// # Errors
///
/// * `InvalidName` - the new name is empty or whitespace-only
/// * `DuplicateName` - a sibling already uses the name
/// * `ObjectNotFound` / `ObjectDeleted` - `id` is not live
pub fn rename_object(model: &mut Model, id: ObjectId, name: &str) -> Result<RenameOutcome> {
    let handle = model.get_live(id)?;
    let old = handle.name().to_string();
    let key = handle.collection();
    if old == name {
        return Ok(RenameOutcome::Unchanged);
    }
    validate_name(name)?;

    let new_value = PropertyValue::Text(name.to_string());
    if model
        .notifier
        .property_changing(id, PropertyName::Name, &new_value)
    {
        tracing::debug!(object_id = %id, "rename vetoed by listener");
        return Ok(RenameOutcome::Vetoed);
    }

    if let Some(key) = key {
        if model.collection(key)?.is_name_taken(name, Some(id)) {
            return Err(ModelError::DuplicateName {
                name: name.to_string(),
                owner: key.owner,
                child_kind: key.child_kind,
            });
        }
    }
    let handle = model.handle_mut(id)?;
    handle.name = name.to_string();
    handle.touch();

    let old_value = PropertyValue::Text(old.clone());
    model.log.add(UndoOperation::PropertyChange {
        object: id,
        property: PropertyName::Name,
        old: old_value.clone(),
        new: new_value.clone(),
    });

    if let Some(key) = key {
        model.collection_mut(key)?.reindex_name(id, &old, name);
    }

    model.notifier.publish(ChangeEvent::PropertyChanged {
        object: id,
        property: PropertyName::Name,
        old: old_value,
        new: new_value,
    });
    Ok(RenameOutcome::Renamed)
}

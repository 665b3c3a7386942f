//! Collection membership changes
//!
//! Every membership change publishes its structural event immediately, so a
//! tree view never observes the model out of sync with the collections.

use crate::errors::{ModelError, Result};
use crate::history::UndoOperation;
use crate::model::{CollectionRef, ObjectId};
use crate::notify::ChangeEvent;

use super::history_ops::in_batch;
use super::Model;

/// Insert `id` into `key` at `index` and point the handle at it
///
/// Idempotent: if the collection already holds `id` only the handle's owner
/// is updated and no event fires. Returns the position of `id`.
///
/// # Errors
///
/// Returns `ObjectNotFound` or `CollectionNotFound` for unknown ids/keys.
pub(crate) fn attach(
    model: &mut Model,
    id: ObjectId,
    key: CollectionRef,
    index: usize,
) -> Result<usize> {
    let name = model.get(id)?.name().to_string();
    let collection = model.collection_mut(key)?;
    let (position, inserted) = match collection.index_of(id) {
        Some(position) => (position, false),
        None => (collection.insert(index, id, &name), true),
    };
    model.handle_mut(id)?.collection = Some(key);

    if inserted {
        tracing::debug!(object_id = %id, collection = %key, index = position, "attached");
        model.notifier.publish(ChangeEvent::NodeInserted {
            parent: key.owner,
            collection: key.child_kind,
            children: vec![id],
        });
    }
    Ok(position)
}

/// Remove `id` from its owning collection and clear the handle's owner
///
/// Returns the collection and the position the object occupied.
///
/// # Errors
///
/// Returns `ObjectDeleted` if the handle is already detached, and `Internal`
/// if the handle and its collection disagree.
pub(crate) fn detach(model: &mut Model, id: ObjectId) -> Result<(CollectionRef, usize)> {
    let handle = model.get(id)?;
    let key = handle
        .collection()
        .ok_or(ModelError::ObjectDeleted { object_id: id })?;
    let name = handle.name().to_string();

    let index = model
        .collection_mut(key)?
        .remove(id, &name)
        .ok_or_else(|| ModelError::Internal {
            message: format!("{} points at {} but is not a member", id, key),
        })?;
    model.handle_mut(id)?.collection = None;

    tracing::debug!(object_id = %id, collection = %key, index, "detached");
    model.notifier.publish(ChangeEvent::NodeRemoved {
        parent: key.owner,
        collection: key.child_kind,
        children: vec![id],
    });
    Ok((key, index))
}

/// Undoable removal of `id` from its collection
///
/// Runs in its own nested batch so the removal can be told apart from the
/// cleanup that surrounds it.
///
/// # Errors
///
/// Same as [`detach`].
pub(crate) fn remove_from_collection(
    model: &mut Model,
    id: ObjectId,
) -> Result<(CollectionRef, usize)> {
    let kind = model.get(id)?.kind();
    in_batch(model, format!("Remove {}", kind), |model| {
        let (key, index) = detach(model, id)?;
        model.log.add(UndoOperation::CollectionRemove {
            collection: key,
            object: id,
            index,
        });
        Ok((key, index))
    })
}

/// First free name in `key` for a new object called `base`
///
/// # Errors
///
/// Returns `CollectionNotFound` for unknown keys.
pub fn unique_name(model: &Model, key: CollectionRef, base: &str) -> Result<String> {
    Ok(model.collection(key)?.unique_name(base))
}

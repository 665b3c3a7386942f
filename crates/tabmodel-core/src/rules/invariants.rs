use std::collections::HashMap;

use crate::model::collection::fold_name;
use crate::model::{CollectionRef, ObjectId, ObjectKind};
use crate::ops::Model;

/// Dependency edges recorded on one side only
///
/// Returns `(from, to)` pairs present in exactly one of `DependsOn` and
/// `ReferencedBy`.
pub fn find_asymmetric_edges(model: &Model) -> Vec<(ObjectId, ObjectId)> {
    let forward = model.graph().edges();
    let reverse = model.graph().reverse_edges();
    let mut asymmetric: Vec<_> = forward
        .iter()
        .filter(|edge| !reverse.contains(edge))
        .chain(reverse.iter().filter(|edge| !forward.contains(edge)))
        .copied()
        .collect();
    asymmetric.sort();
    asymmetric.dedup();
    asymmetric
}

/// Dependency edges with a detached endpoint
pub fn find_edges_touching_detached(model: &Model) -> Vec<(ObjectId, ObjectId)> {
    model
        .graph()
        .edges()
        .into_iter()
        .filter(|(from, to)| !model.is_live(*from) || !model.is_live(*to))
        .collect()
}

/// Siblings sharing a name (case-insensitively) within one collection
///
/// Returns `(first, second)` pairs.
pub fn find_duplicate_sibling_names(model: &Model) -> Vec<(ObjectId, ObjectId)> {
    let mut duplicates = Vec::new();
    let mut keys: Vec<_> = model.collections.keys().copied().collect();
    keys.sort();

    for key in keys {
        let Ok(collection) = model.collection(key) else {
            continue;
        };
        let mut seen: HashMap<String, ObjectId> = HashMap::new();
        for id in collection.items() {
            let Ok(handle) = model.get(*id) else {
                continue;
            };
            if let Some(first) = seen.insert(fold_name(handle.name()), *id) {
                duplicates.push((first, *id));
            }
        }
    }
    duplicates
}

/// Handles whose owner pointer and collection membership disagree
///
/// Covers live handles missing from the collection they point at, and
/// collection members of a live owner whose handle points elsewhere.
pub fn find_membership_mismatches(model: &Model) -> Vec<ObjectId> {
    let mut mismatches = Vec::new();
    for id in model.live_objects() {
        let Ok(handle) = model.get(id) else {
            continue;
        };
        if let Some(key) = handle.collection() {
            let listed = model.collection(key).is_ok_and(|c| c.contains(id));
            if !listed || !model.is_live(key.owner) {
                mismatches.push(id);
            }
        }
        for child_kind in handle.kind().owned_collections() {
            let key = CollectionRef::new(id, *child_kind);
            let Ok(collection) = model.collection(key) else {
                continue;
            };
            for child in collection.items() {
                if model.get(*child).map(|h| h.collection()) != Ok(Some(key)) {
                    mismatches.push(*child);
                }
            }
        }
    }
    mismatches.sort();
    mismatches.dedup();
    mismatches
}

/// Detached objects that still carry translations or perspective memberships
/// or are still registered in the entity lookup table
pub fn find_detached_with_references(model: &Model) -> Vec<ObjectId> {
    let mut found: Vec<_> = model
        .graph()
        .translation_holders()
        .into_iter()
        .chain(model.graph().perspective_holders())
        .chain(model.lookup.values().copied())
        .filter(|id| !model.is_live(*id))
        .collect();
    found.sort();
    found.dedup();
    found
}

/// Live levels whose source column is not a live column
pub fn find_dangling_level_sources(model: &Model) -> Vec<ObjectId> {
    model
        .live_objects()
        .into_iter()
        .filter(|id| {
            model.get(*id).is_ok_and(|h| {
                h.kind() == ObjectKind::Level
                    && !h.source_column().is_some_and(|column| model.is_live(column))
            })
        })
        .collect()
}

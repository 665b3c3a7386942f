use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::kind::ChildKind;
use super::object::ObjectId;

/// Stable key of a child collection: owner plus child kind
///
/// Resolving a key through the model always yields the live collection
/// instance, never a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionRef {
    pub owner: ObjectId,
    pub child_kind: ChildKind,
}

impl CollectionRef {
    pub fn new(owner: ObjectId, child_kind: ChildKind) -> Self {
        Self { owner, child_kind }
    }
}

impl std::fmt::Display for CollectionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.owner, self.child_kind)
    }
}

/// Fold a name for case-insensitive uniqueness checks
pub(crate) fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

/// Ordered, owning container of sibling handles
///
/// Owns the authoritative insertion order. Names are unique within the
/// collection, compared case-insensitively.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    key: CollectionRef,
    items: Vec<ObjectId>,
    by_name: HashMap<String, ObjectId>,
}

impl Collection {
    pub fn new(key: CollectionRef) -> Self {
        Self {
            key,
            items: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn key(&self) -> CollectionRef {
        self.key
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Members in insertion order
    pub fn items(&self) -> &[ObjectId] {
        &self.items
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.items.iter().position(|item| *item == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.items.contains(&id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        self.by_name.get(&fold_name(name)).copied()
    }

    /// Whether `name` is used by a member other than `except`
    pub fn is_name_taken(&self, name: &str, except: Option<ObjectId>) -> bool {
        match self.find_by_name(name) {
            Some(owner) => Some(owner) != except,
            None => false,
        }
    }

    /// First free name of the form `base`, `base 1`, `base 2`, ...
    pub fn unique_name(&self, base: &str) -> String {
        if !self.is_name_taken(base, None) {
            return base.to_string();
        }
        let mut suffix = 1u32;
        loop {
            let candidate = format!("{} {}", base, suffix);
            if !self.is_name_taken(&candidate, None) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Insert at `index` (clamped to the end); returns the actual position
    pub(crate) fn insert(&mut self, index: usize, id: ObjectId, name: &str) -> usize {
        let index = index.min(self.items.len());
        self.items.insert(index, id);
        self.by_name.insert(fold_name(name), id);
        index
    }

    /// Remove `id`; returns the position it occupied
    pub(crate) fn remove(&mut self, id: ObjectId, name: &str) -> Option<usize> {
        let index = self.index_of(id)?;
        self.items.remove(index);
        let folded = fold_name(name);
        if self.by_name.get(&folded) == Some(&id) {
            self.by_name.remove(&folded);
        }
        Some(index)
    }

    /// Move the name-index entry of `id` from `old` to `new`
    pub(crate) fn reindex_name(&mut self, id: ObjectId, old: &str, new: &str) {
        let folded = fold_name(old);
        if self.by_name.get(&folded) == Some(&id) {
            self.by_name.remove(&folded);
        }
        if self.contains(id) {
            self.by_name.insert(fold_name(new), id);
        }
    }
}

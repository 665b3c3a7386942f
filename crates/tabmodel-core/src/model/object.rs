use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::collection::CollectionRef;
use super::facet::{Facet, FacetSet};
use super::kind::ObjectKind;

/// Stable identifier of an object handle within one model
///
/// Ids are arena indices: they are never reused, survive delete/undelete and
/// are what the reference graph and transaction log key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Token of one materialization of the underlying domain entity
///
/// Undelete re-materializes the entity from scratch, so a handle gets a fresh
/// token every time it comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityToken(Uuid);

impl EntityToken {
    /// Materialize a new entity (UUID v7, time-ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntityToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle over one domain entity
///
/// A handle with `collection == None` is logically deleted but stays in the
/// model arena so the transaction log can bring it back.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectHandle {
    pub(crate) id: ObjectId,
    pub(crate) kind: ObjectKind,
    pub(crate) name: String,
    pub(crate) collection: Option<CollectionRef>,
    pub(crate) entity: Option<EntityToken>,
    pub(crate) facets: FacetSet,
    pub(crate) expression: Option<String>,
    pub(crate) ordinal: Option<u32>,
    pub(crate) source_column: Option<ObjectId>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) modified_at: DateTime<Utc>,
}

impl ObjectHandle {
    /// Create a detached, unmaterialized handle with the kind's default facets
    pub(crate) fn new(id: ObjectId, kind: ObjectKind, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind,
            name,
            collection: None,
            entity: None,
            facets: kind.default_facets(),
            expression: None,
            ordinal: None,
            source_column: None,
            created_at: now,
            modified_at: now,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Current cached name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning collection; `None` while detached
    pub fn collection(&self) -> Option<CollectionRef> {
        self.collection
    }

    /// Current materialization of the domain entity; `None` while detached
    pub fn entity(&self) -> Option<EntityToken> {
        self.entity
    }

    pub fn facets(&self) -> FacetSet {
        self.facets
    }

    pub fn supports(&self, facet: Facet) -> bool {
        self.facets.contains(facet)
    }

    /// Formula text for formula-bearing objects
    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    /// Position of a level inside its hierarchy
    pub fn ordinal(&self) -> Option<u32> {
        self.ordinal
    }

    /// Column a level is built on
    pub fn source_column(&self) -> Option<ObjectId> {
        self.source_column
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    /// Whether the handle is attached to a collection
    pub fn is_attached(&self) -> bool {
        self.collection.is_some()
    }

    pub(crate) fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

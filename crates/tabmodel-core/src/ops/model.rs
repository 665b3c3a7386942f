use std::collections::HashMap;

use uuid::Uuid;

use crate::config::EngineConfig;
use crate::errors::{ModelError, Result};
use crate::formula::{BracketReferenceResolver, FormulaResolver};
use crate::graph::ReferenceGraph;
use crate::history::TransactionLog;
use crate::model::{
    ChildKind, Collection, CollectionRef, EntityToken, ObjectHandle, ObjectId, ObjectKind,
};
use crate::notify::{ChangeNotifier, ModelListener};
use crate::policy::{AllowAllPolicy, GovernancePolicy, RestrictedKindsPolicy};

/// Per-document model context
///
/// Holds the object arena, the owned collections, the entity lookup table,
/// the reference graph, the transaction log, the change notifier and the
/// injected collaborators (governance policy, formula resolver). One value
/// per open document; nothing is shared between documents.
///
/// Not thread-safe - designed for single-threaded use.
pub struct Model {
    document_id: Uuid,
    root: ObjectId,
    next_id: u64,
    /// Arena of every handle ever created, including detached ones
    pub(crate) objects: HashMap<ObjectId, ObjectHandle>,
    pub(crate) collections: HashMap<CollectionRef, Collection>,
    /// Entity lookup table (current materialization -> handle)
    pub(crate) lookup: HashMap<EntityToken, ObjectId>,
    pub(crate) graph: ReferenceGraph,
    pub(crate) log: TransactionLog,
    pub(crate) notifier: ChangeNotifier,
    pub(crate) governance: Box<dyn GovernancePolicy>,
    pub(crate) resolver: Box<dyn FormulaResolver>,
}

impl Model {
    /// Create an empty document with default collaborators
    pub fn new() -> Self {
        let mut model = Self {
            document_id: Uuid::now_v7(),
            root: ObjectId::new(0),
            next_id: 0,
            objects: HashMap::new(),
            collections: HashMap::new(),
            lookup: HashMap::new(),
            graph: ReferenceGraph::new(),
            log: TransactionLog::new(0),
            notifier: ChangeNotifier::new(),
            governance: Box::new(AllowAllPolicy),
            resolver: Box::new(BracketReferenceResolver::new()),
        };
        let root = model.alloc_handle(ObjectKind::Model, "Model");
        model.materialize(root);
        model.root = root;
        model
    }

    /// Create an empty document configured from `config`
    pub fn with_config(config: &EngineConfig) -> Self {
        let mut model = Self::new();
        model.log = TransactionLog::new(config.history.max_depth);
        if !config.governance.forbid_delete.is_empty() {
            model.governance = Box::new(RestrictedKindsPolicy::from_config(&config.governance));
        }
        model
    }

    /// Replace the governance policy
    pub fn with_governance(mut self, policy: impl GovernancePolicy + 'static) -> Self {
        self.governance = Box::new(policy);
        self
    }

    /// Replace the formula resolver used by dependency rebuilds
    pub fn with_resolver(mut self, resolver: impl FormulaResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Register a change listener
    pub fn subscribe(&mut self, listener: Box<dyn ModelListener>) {
        self.notifier.subscribe(listener);
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    /// The document root (kind `Model`)
    pub fn root(&self) -> ObjectId {
        self.root
    }

    pub fn graph(&self) -> &ReferenceGraph {
        &self.graph
    }

    pub fn history(&self) -> &TransactionLog {
        &self.log
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Open a (possibly nested) undo batch around several operations
    pub fn begin_batch(&mut self, label: impl Into<String>) {
        self.log.begin_batch(label);
    }

    /// Close the innermost batch opened with [`Model::begin_batch`]
    ///
    /// # Errors
    ///
    /// Returns `NoOpenBatch` if no batch is open.
    pub fn end_batch(&mut self) -> Result<()> {
        self.log.end_batch()
    }

    /// Get a handle by id, attached or not
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` if the id was never allocated.
    pub fn get(&self, id: ObjectId) -> Result<&ObjectHandle> {
        self.objects
            .get(&id)
            .ok_or(ModelError::ObjectNotFound { object_id: id })
    }

    /// Get a handle that is currently part of the tree
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` for unknown ids and `ObjectDeleted` for
    /// detached handles.
    pub fn get_live(&self, id: ObjectId) -> Result<&ObjectHandle> {
        let handle = self.get(id)?;
        if !self.is_live(id) {
            return Err(ModelError::ObjectDeleted { object_id: id });
        }
        Ok(handle)
    }

    pub(crate) fn handle_mut(&mut self, id: ObjectId) -> Result<&mut ObjectHandle> {
        self.objects
            .get_mut(&id)
            .ok_or(ModelError::ObjectNotFound { object_id: id })
    }

    /// Whether `id` is reachable from the root
    ///
    /// Walks the owner chain; an attached handle under a detached ancestor
    /// is not live.
    pub fn is_live(&self, id: ObjectId) -> bool {
        let mut current = id;
        while current != self.root {
            match self.objects.get(&current).and_then(ObjectHandle::collection) {
                Some(key) => current = key.owner,
                None => return false,
            }
        }
        true
    }

    /// Look up a collection by key
    ///
    /// # Errors
    ///
    /// Returns `CollectionNotFound` if no such collection was ever created.
    pub fn collection(&self, key: CollectionRef) -> Result<&Collection> {
        self.collections
            .get(&key)
            .ok_or(ModelError::CollectionNotFound {
                owner: key.owner,
                child_kind: key.child_kind,
            })
    }

    pub(crate) fn collection_mut(&mut self, key: CollectionRef) -> Result<&mut Collection> {
        self.collections
            .get_mut(&key)
            .ok_or(ModelError::CollectionNotFound {
                owner: key.owner,
                child_kind: key.child_kind,
            })
    }

    /// Child collection of `owner`
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` if objects of the owner's kind do not
    /// own `child_kind`. This is a contract violation and is logged at error
    /// level.
    pub fn child_collection(&self, owner: ObjectId, child_kind: ChildKind) -> Result<&Collection> {
        let kind = self.get(owner)?.kind();
        if !kind.owns(child_kind) {
            tracing::error!(
                object_id = %owner,
                object_kind = %kind,
                collection = %child_kind,
                "child collection requested on an object that does not own it"
            );
            return Err(ModelError::UnsupportedOperation {
                object_id: owner,
                kind,
                operation: format!("child collection {}", child_kind),
            });
        }
        self.collection(CollectionRef::new(owner, child_kind))
    }

    /// Direct children of `id` across all its collections, in tree order
    pub fn children(&self, id: ObjectId) -> Vec<ObjectId> {
        let Some(handle) = self.objects.get(&id) else {
            return Vec::new();
        };
        handle
            .kind()
            .owned_collections()
            .iter()
            .filter_map(|ck| self.collections.get(&CollectionRef::new(id, *ck)))
            .flat_map(|c| c.items().iter().copied())
            .collect()
    }

    /// Every object below `id`, parents before children
    ///
    /// Walks collection membership, so it also works on a detached subtree.
    pub fn descendants(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut stack: Vec<ObjectId> = self.children(id).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    /// Every object below `id`, children before parents
    pub fn descendants_postorder(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        for child in self.children(id) {
            out.extend(self.descendants_postorder(child));
            out.push(child);
        }
        out
    }

    /// Every live object, root first, depth-first
    pub fn live_objects(&self) -> Vec<ObjectId> {
        let mut out = vec![self.root];
        out.extend(self.descendants(self.root));
        out
    }

    /// Position of `id` in its owning collection; `None` while detached
    pub fn metadata_index(&self, id: ObjectId) -> Option<usize> {
        let key = self.objects.get(&id)?.collection()?;
        self.collections.get(&key)?.index_of(id)
    }

    /// Handle currently materializing `token`
    pub fn resolve_entity(&self, token: EntityToken) -> Option<ObjectId> {
        self.lookup.get(&token).copied()
    }

    /// Live table by name
    pub fn find_table(&self, name: &str) -> Option<ObjectId> {
        self.collections
            .get(&CollectionRef::new(self.root, ChildKind::Tables))?
            .find_by_name(name)
    }

    /// Column or measure of `table` by name (columns win)
    pub fn find_member(&self, table: ObjectId, name: &str) -> Option<ObjectId> {
        [ChildKind::Columns, ChildKind::Measures]
            .iter()
            .filter_map(|ck| self.collections.get(&CollectionRef::new(table, *ck)))
            .find_map(|c| c.find_by_name(name))
    }

    /// Live measure by name in any table
    pub fn find_measure(&self, name: &str) -> Option<ObjectId> {
        let tables = self
            .collections
            .get(&CollectionRef::new(self.root, ChildKind::Tables))?;
        tables.items().iter().find_map(|table| {
            self.collections
                .get(&CollectionRef::new(*table, ChildKind::Measures))
                .and_then(|c| c.find_by_name(name))
        })
    }

    /// Nearest table at or above `id` (by collection ownership)
    pub fn owning_table(&self, id: ObjectId) -> Option<ObjectId> {
        let mut current = id;
        loop {
            let handle = self.objects.get(&current)?;
            if handle.kind() == ObjectKind::Table {
                return Some(current);
            }
            current = handle.collection()?.owner;
        }
    }

    /// Allocate a detached, unmaterialized handle plus its owned collections
    pub(crate) fn alloc_handle(&mut self, kind: ObjectKind, name: &str) -> ObjectId {
        let id = ObjectId::new(self.next_id);
        self.next_id += 1;
        self.objects
            .insert(id, ObjectHandle::new(id, kind, name.to_string()));
        for child_kind in kind.owned_collections() {
            let key = CollectionRef::new(id, *child_kind);
            self.collections.insert(key, Collection::new(key));
        }
        id
    }

    /// Give `id` a fresh entity token and register it in the lookup table
    pub(crate) fn materialize(&mut self, id: ObjectId) {
        self.dematerialize(id);
        let token = EntityToken::new();
        if let Some(handle) = self.objects.get_mut(&id) {
            handle.entity = Some(token);
            self.lookup.insert(token, id);
        }
    }

    /// Drop the entity token of `id` from the lookup table
    pub(crate) fn dematerialize(&mut self, id: ObjectId) {
        if let Some(token) = self.objects.get_mut(&id).and_then(|h| h.entity.take()) {
            self.lookup.remove(&token);
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("document_id", &self.document_id)
            .field("objects", &self.objects.len())
            .field("collections", &self.collections.len())
            .field("edges", &self.graph.edge_count())
            .field("undo_depth", &self.log.undo_depth())
            .field("notifier", &self.notifier)
            .finish()
    }
}

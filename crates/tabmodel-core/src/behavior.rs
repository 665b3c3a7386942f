//! Per-kind lifecycle extension points
//!
//! The lifecycle operations call into a [`KindBehavior`] at fixed points:
//! the delete permission hook, pre-delete cleanup, post-removal cleanup and
//! restoration of owned children on undelete. Each object kind gets a small
//! implementation; kinds with nothing special use the defaults.

use std::collections::HashSet;

use crate::errors::Result;
use crate::history::UndoOperation;
use crate::model::{CollectionRef, ObjectId, ObjectKind, PropertyName, PropertyValue};
use crate::ops::{property_ops, Model};

/// Answer of an object's own delete hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteVerdict {
    /// Deletion may proceed; `advisory` is shown to the user if present
    Allowed { advisory: Option<String> },
    Forbidden { reason: String },
}

impl DeleteVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, DeleteVerdict::Allowed { .. })
    }

    /// Advisory or denial text, if any
    pub fn message(&self) -> Option<&str> {
        match self {
            DeleteVerdict::Allowed { advisory } => advisory.as_deref(),
            DeleteVerdict::Forbidden { reason } => Some(reason),
        }
    }
}

/// Kind-specific hooks called by the lifecycle operations
pub trait KindBehavior: Sync {
    /// Object-specific permission check, consulted after governance
    fn allow_delete(&self, _model: &Model, _id: ObjectId) -> DeleteVerdict {
        DeleteVerdict::Allowed { advisory: None }
    }

    /// Cleanup before the object's references are severed
    ///
    /// Every mutation must be logged so undo restores it.
    fn before_delete(&self, _model: &mut Model, _id: ObjectId) -> Result<()> {
        Ok(())
    }

    /// Cleanup after the deleted object left its collection
    ///
    /// `original` is the collection the object sat in before the delete
    /// started.
    fn after_removal(
        &self,
        _model: &mut Model,
        _id: ObjectId,
        _original: Option<CollectionRef>,
    ) -> Result<()> {
        Ok(())
    }

    /// Re-attach every object this one exclusively owns after an undelete
    ///
    /// Owned children stay in their collections while the owner is deleted,
    /// so restoring means re-pointing each child at its live collection and
    /// re-materializing it, recursively.
    fn restore_owned(&self, model: &mut Model, id: ObjectId) -> Result<()> {
        let kind = model.get(id)?.kind();
        for child_kind in kind.owned_collections() {
            let key = CollectionRef::new(id, *child_kind);
            let members = model.collection(key)?.items().to_vec();
            for child in members {
                let handle = model.handle_mut(child)?;
                handle.collection = Some(key);
                let member_kind = handle.kind();
                if handle.entity().is_none() {
                    model.materialize(child);
                }
                behavior_for(member_kind).restore_owned(model, child)?;
            }
        }
        Ok(())
    }
}

/// Live objects outside the subtree of `id` whose formulas reference it or
/// anything below it
pub(crate) fn external_dependants(model: &Model, id: ObjectId) -> Vec<ObjectId> {
    let mut subtree: HashSet<ObjectId> = model.descendants(id).into_iter().collect();
    subtree.insert(id);

    let mut dependants: Vec<ObjectId> = subtree
        .iter()
        .flat_map(|member| model.graph().dependants(*member))
        .filter(|dependant| !subtree.contains(dependant) && model.is_live(*dependant))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    dependants.sort();
    dependants
}

fn referenced_advisory(model: &Model, id: ObjectId) -> DeleteVerdict {
    let dependants = external_dependants(model, id);
    if dependants.is_empty() {
        return DeleteVerdict::Allowed { advisory: None };
    }
    let name = model.get(id).map(|h| h.name().to_string()).unwrap_or_default();
    DeleteVerdict::Allowed {
        advisory: Some(format!(
            "'{}' is referenced by {} object(s); their formulas will no longer resolve",
            name,
            dependants.len()
        )),
    }
}

struct RootBehavior;

impl KindBehavior for RootBehavior {
    fn allow_delete(&self, _model: &Model, _id: ObjectId) -> DeleteVerdict {
        DeleteVerdict::Forbidden {
            reason: "the model root cannot be deleted".to_string(),
        }
    }
}

/// Tables and measures: warn when formulas reference them
struct ReferencedBehavior;

impl KindBehavior for ReferencedBehavior {
    fn allow_delete(&self, model: &Model, id: ObjectId) -> DeleteVerdict {
        referenced_advisory(model, id)
    }
}

/// Columns: refuse while a hierarchy level is built on the column
struct ColumnBehavior;

impl KindBehavior for ColumnBehavior {
    fn allow_delete(&self, model: &Model, id: ObjectId) -> DeleteVerdict {
        let user = model.live_objects().into_iter().find(|candidate| {
            model
                .get(*candidate)
                .is_ok_and(|h| h.kind() == ObjectKind::Level && h.source_column() == Some(id))
        });
        if let Some(level) = user {
            let level_name = model.get(level).map(|h| h.name().to_string()).unwrap_or_default();
            return DeleteVerdict::Forbidden {
                reason: format!("column is used by hierarchy level '{}'", level_name),
            };
        }
        referenced_advisory(model, id)
    }
}

/// Levels: renumber the remaining siblings after one is removed
struct LevelBehavior;

impl KindBehavior for LevelBehavior {
    fn after_removal(
        &self,
        model: &mut Model,
        _id: ObjectId,
        original: Option<CollectionRef>,
    ) -> Result<()> {
        let Some(key) = original else {
            return Ok(());
        };
        let siblings = model.collection(key)?.items().to_vec();
        for (position, sibling) in siblings.into_iter().enumerate() {
            let ordinal = position as u32;
            let current = model.get(sibling)?.ordinal();
            if current == Some(ordinal) {
                continue;
            }
            let old = PropertyValue::from(current);
            let new = PropertyValue::Integer(ordinal);
            property_ops::write_logged_property(model, sibling, PropertyName::Ordinal, old, new)?;
        }
        Ok(())
    }
}

/// Perspectives: drop every membership in the perspective
struct PerspectiveBehavior;

impl KindBehavior for PerspectiveBehavior {
    fn before_delete(&self, model: &mut Model, id: ObjectId) -> Result<()> {
        for member in model.graph.members_of(id) {
            if model.graph.set_membership(member, id, false) {
                model.log.add(UndoOperation::MembershipChange {
                    object: member,
                    perspective: id,
                    included: false,
                });
            }
        }
        Ok(())
    }
}

/// Cultures: drop every translation keyed by the culture
struct CultureBehavior;

impl KindBehavior for CultureBehavior {
    fn before_delete(&self, model: &mut Model, id: ObjectId) -> Result<()> {
        for (object, entry) in model.graph.translations_for_culture(id) {
            model
                .graph
                .set_translation(object, id, entry.property, None);
            model.log.add(UndoOperation::TranslationChange {
                object,
                culture: id,
                property: entry.property,
                old: Some(entry.value),
                new: None,
            });
        }
        Ok(())
    }
}

struct DefaultBehavior;

impl KindBehavior for DefaultBehavior {}

/// Behavior implementation for `kind`
pub fn behavior_for(kind: ObjectKind) -> &'static dyn KindBehavior {
    match kind {
        ObjectKind::Model => &RootBehavior,
        ObjectKind::Table | ObjectKind::Measure => &ReferencedBehavior,
        ObjectKind::Column => &ColumnBehavior,
        ObjectKind::Level => &LevelBehavior,
        ObjectKind::Perspective => &PerspectiveBehavior,
        ObjectKind::Culture => &CultureBehavior,
        ObjectKind::Hierarchy => &DefaultBehavior,
    }
}

//! Translations, perspective membership and reference teardown

use crate::errors::{ModelError, Result};
use crate::graph::TranslatedProperty;
use crate::history::UndoOperation;
use crate::model::{Facet, ObjectId, ObjectKind};
use crate::notify::ChangeEvent;

use super::Model;

fn require_facet(model: &Model, id: ObjectId, facet: Facet, operation: &str) -> Result<()> {
    let handle = model.get_live(id)?;
    if !handle.supports(facet) {
        tracing::error!(
            object_id = %id,
            object_kind = %handle.kind(),
            facet = facet.label(),
            "operation requires a facet the object does not carry"
        );
        return Err(ModelError::UnsupportedOperation {
            object_id: id,
            kind: handle.kind(),
            operation: operation.to_string(),
        });
    }
    Ok(())
}

fn require_kind(model: &Model, source: ObjectId, id: ObjectId, kind: ObjectKind) -> Result<()> {
    let handle = model.get_live(id)?;
    if handle.kind() != kind {
        return Err(ModelError::InvalidReference {
            object_id: source,
            reason: format!("{} is a {}, expected a {}", id, handle.kind(), kind),
        });
    }
    Ok(())
}

/// Set (or clear with `None`) one translated property of `id` for `culture`
///
/// Returns whether the stored value changed.
///
/// # Errors
///
/// * `UnsupportedOperation` - `id` is not translatable
/// * `InvalidReference` - `culture` is not a live culture
pub fn set_translation(
    model: &mut Model,
    id: ObjectId,
    culture: ObjectId,
    property: TranslatedProperty,
    value: Option<String>,
) -> Result<bool> {
    require_facet(model, id, Facet::Translatable, "set translation")?;
    require_kind(model, id, culture, ObjectKind::Culture)?;

    if model.graph.translation(id, culture, property) == value.as_deref() {
        return Ok(false);
    }
    let old = model
        .graph
        .set_translation(id, culture, property, value.clone());
    model.log.add(UndoOperation::TranslationChange {
        object: id,
        culture,
        property,
        old,
        new: value,
    });
    Ok(true)
}

/// Include or exclude `id` from `perspective`
///
/// Returns whether membership changed.
///
/// # Errors
///
/// * `UnsupportedOperation` - `id` is not perspective-aware
/// * `InvalidReference` - `perspective` is not a live perspective
pub fn set_perspective_membership(
    model: &mut Model,
    id: ObjectId,
    perspective: ObjectId,
    included: bool,
) -> Result<bool> {
    require_facet(model, id, Facet::PerspectiveAware, "set perspective membership")?;
    require_kind(model, id, perspective, ObjectKind::Perspective)?;

    if !model.graph.set_membership(id, perspective, included) {
        return Ok(false);
    }
    model.log.add(UndoOperation::MembershipChange {
        object: id,
        perspective,
        included,
    });
    Ok(true)
}

/// Sever every reference edge owned by `id`
///
/// Translations and perspective memberships are logged so undo restores
/// them. Dependency edges are removed in both directions without logging;
/// they are derived data and come back through a dependency rebuild.
/// Returns the number of entries removed.
pub(crate) fn sever_references(model: &mut Model, id: ObjectId) -> usize {
    let translations = model.graph.clear_translations(id);
    let perspectives = model.graph.clear_perspectives(id);
    let edges = model.graph.sever_dependencies(id);
    let removed = translations.len() + perspectives.len() + edges;

    if !translations.is_empty() {
        model.log.add(UndoOperation::TranslationsCleared {
            object: id,
            entries: translations,
        });
    }
    if !perspectives.is_empty() {
        model.log.add(UndoOperation::PerspectivesCleared {
            object: id,
            perspectives,
        });
    }

    if removed > 0 {
        tracing::debug!(object_id = %id, removed, edges, "references severed");
        model
            .notifier
            .publish(ChangeEvent::ReferencesCleared { object: id });
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::create_ops;

    #[test]
    fn test_translation_requires_facet() {
        let mut model = Model::new();
        let culture = create_ops::create_culture(&mut model, "de-DE").unwrap();
        let other = create_ops::create_culture(&mut model, "fr-FR").unwrap();

        let result = set_translation(
            &mut model,
            other,
            culture,
            TranslatedProperty::Caption,
            Some("x".to_string()),
        );
        assert!(matches!(
            result,
            Err(ModelError::UnsupportedOperation {
                kind: ObjectKind::Culture,
                ..
            })
        ));
    }

    #[test]
    fn test_translation_culture_must_be_a_culture() {
        let mut model = Model::new();
        let table = create_ops::create_table(&mut model, "Sales").unwrap();
        let perspective = create_ops::create_perspective(&mut model, "Finance").unwrap();

        let result = set_translation(
            &mut model,
            table,
            perspective,
            TranslatedProperty::Caption,
            Some("Umsatz".to_string()),
        );
        assert!(matches!(result, Err(ModelError::InvalidReference { .. })));
    }

    #[test]
    fn test_set_translation_reports_change() {
        let mut model = Model::new();
        let table = create_ops::create_table(&mut model, "Sales").unwrap();
        let culture = create_ops::create_culture(&mut model, "de-DE").unwrap();

        let caption = Some("Umsatz".to_string());
        let prop = TranslatedProperty::Caption;
        assert!(set_translation(&mut model, table, culture, prop, caption.clone()).unwrap());
        assert!(!set_translation(&mut model, table, culture, prop, caption).unwrap());
        assert_eq!(
            model
                .graph()
                .translation(table, culture, TranslatedProperty::Caption),
            Some("Umsatz")
        );
        assert_eq!(model.history().undo_labels()[0], "Set Translation");
    }

    #[test]
    fn test_membership_toggle() {
        let mut model = Model::new();
        let table = create_ops::create_table(&mut model, "Sales").unwrap();
        let perspective = create_ops::create_perspective(&mut model, "Finance").unwrap();

        assert!(set_perspective_membership(&mut model, table, perspective, true).unwrap());
        assert!(!set_perspective_membership(&mut model, table, perspective, true).unwrap());
        assert!(model.graph().is_in_perspective(table, perspective));

        assert!(set_perspective_membership(&mut model, table, perspective, false).unwrap());
        assert!(model.graph().perspectives_of(table).is_empty());
    }

    #[test]
    fn test_sever_references_logs_restorable_entries() {
        let mut model = Model::new();
        let table = create_ops::create_table(&mut model, "Sales").unwrap();
        let perspective = create_ops::create_perspective(&mut model, "Finance").unwrap();
        let culture = create_ops::create_culture(&mut model, "de-DE").unwrap();
        set_perspective_membership(&mut model, table, perspective, true).unwrap();
        set_translation(
            &mut model,
            table,
            culture,
            TranslatedProperty::Description,
            Some("Verkäufe".to_string()),
        )
        .unwrap();
        let depth = model.history().undo_depth();

        assert_eq!(sever_references(&mut model, table), 2);
        assert!(model.graph().translations_of(table).is_empty());
        assert!(model.graph().perspectives_of(table).is_empty());
        assert_eq!(model.history().undo_depth(), depth + 2);
    }
}

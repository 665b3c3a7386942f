#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{journal, sales_model};
use tabmodel_core::graph::TranslatedProperty;
use tabmodel_core::notify::ChangeEvent;
use tabmodel_core::ops::{create_ops, history_ops, lifecycle_ops, DeleteOutcome};
use tabmodel_core::rules::validation::validate_model;
use tabmodel_core::{ChildKind, CollectionRef, Model, ModelError, ObjectKind};

#[test]
fn test_delete_middle_of_three_and_undo_redo() {
    // GIVEN perspectives [A, B, C]
    let mut model = Model::new();
    let a = create_ops::create_perspective(&mut model, "A").unwrap();
    let b = create_ops::create_perspective(&mut model, "B").unwrap();
    let c = create_ops::create_perspective(&mut model, "C").unwrap();
    let key = CollectionRef::new(model.root(), ChildKind::Perspectives);

    // WHEN B is deleted
    let outcome = lifecycle_ops::delete_object(&mut model, b).unwrap();

    // THEN the collection is [A, C] and B is detached
    assert_eq!(outcome, DeleteOutcome::Deleted { advisory: None });
    assert_eq!(model.collection(key).unwrap().items(), &[a, c]);
    assert_eq!(
        model.get_live(b).unwrap_err(),
        ModelError::ObjectDeleted { object_id: b }
    );
    assert!(model.get(b).unwrap().entity().is_none());

    // WHEN undone THEN B is back in the middle
    assert_eq!(
        history_ops::undo(&mut model).unwrap().as_deref(),
        Some("Delete Perspective")
    );
    assert_eq!(model.collection(key).unwrap().items(), &[a, b, c]);
    assert_eq!(model.metadata_index(b), Some(1));

    // WHEN redone THEN B is gone again
    history_ops::redo(&mut model).unwrap();
    assert_eq!(model.collection(key).unwrap().items(), &[a, c]);
    assert!(validate_model(&model).is_ok());
}

#[test]
fn test_delete_measure_severs_every_reference() {
    // GIVEN Total is translated, in a perspective and referenced by Double
    let (mut model, f) = sales_model();
    assert_eq!(model.graph().dependants(f.total), vec![f.double]);
    assert_eq!(model.graph().dependencies(f.total), vec![f.amount]);

    // WHEN Total is deleted
    let outcome = lifecycle_ops::delete_object(&mut model, f.total).unwrap();

    // THEN the advisory mentions the dependant and no edge survives
    let DeleteOutcome::Deleted { advisory } = outcome else {
        panic!("expected delete to go through");
    };
    assert!(advisory.unwrap().contains("Total"));
    assert!(!model.graph().has_dependency_edges(f.total));
    assert!(model.graph().dependencies(f.double).is_empty());
    assert!(model.graph().dependants(f.amount).is_empty());
    assert!(model.graph().perspectives_of(f.total).is_empty());
    assert!(model.graph().translations_of(f.total).is_empty());
    assert!(validate_model(&model).is_ok());
}

#[test]
fn test_delete_table_cascades_to_whole_subtree() {
    let (mut model, f) = sales_model();

    lifecycle_ops::delete_object(&mut model, f.sales).unwrap();

    for id in [
        f.sales,
        f.amount,
        f.qty,
        f.total,
        f.double,
        f.hierarchy,
        f.level_amount,
        f.level_qty,
    ] {
        assert!(!model.is_live(id), "{} should be detached", id);
        assert!(model.get(id).unwrap().entity().is_none());
    }
    assert!(model.is_live(f.perspective));
    assert!(model.is_live(f.culture));
    assert_eq!(model.graph().edge_count(), 0);
    assert!(model.graph().members_of(f.perspective).is_empty());
    assert!(model.graph().translations_for_culture(f.culture).is_empty());
    assert_eq!(model.find_table("Sales"), None);
    assert!(validate_model(&model).is_ok());
}

#[test]
fn test_references_are_cleared_before_containment_changes() {
    // GIVEN a listener recording every event
    let (mut model, f) = sales_model();
    let journal = journal(&mut model);

    // WHEN the table is deleted
    lifecycle_ops::delete_object(&mut model, f.sales).unwrap();

    // THEN every ReferencesCleared precedes the NodeRemoved of the table
    let events = journal.events();
    let removed_at = events
        .iter()
        .position(|e| {
            matches!(e, ChangeEvent::NodeRemoved { children, .. } if children == &vec![f.sales])
        })
        .unwrap();
    let cleared: Vec<_> = events
        .iter()
        .enumerate()
        .filter_map(|(i, e)| match e {
            ChangeEvent::ReferencesCleared { object } => Some((i, *object)),
            _ => None,
        })
        .collect();
    assert!(cleared.iter().any(|(_, object)| *object == f.total));
    assert!(cleared.iter().all(|(i, _)| *i < removed_at));

    // AND the final event announces the delete
    assert_eq!(
        events.last(),
        Some(&ChangeEvent::ObjectDeleted {
            object: f.sales,
            kind: ObjectKind::Table,
        })
    );
}

#[test]
fn test_column_used_by_level_cannot_be_deleted() {
    let (mut model, f) = sales_model();
    let depth = model.history().undo_depth();

    let result = lifecycle_ops::delete_object(&mut model, f.amount);

    assert!(matches!(
        result,
        Err(ModelError::DeletionForbidden { object_id, kind: ObjectKind::Column, ref reason })
            if object_id == f.amount && reason.contains("By Amount")
    ));
    assert!(model.is_live(f.amount));
    assert_eq!(model.history().undo_depth(), depth);

    // once the level is gone the column may go
    lifecycle_ops::delete_object(&mut model, f.level_amount).unwrap();
    assert!(lifecycle_ops::delete_object(&mut model, f.amount).is_ok());
}

#[test]
fn test_deleting_level_renumbers_siblings_and_undo_restores() {
    let (mut model, f) = sales_model();
    assert_eq!(model.get(f.level_qty).unwrap().ordinal(), Some(1));

    lifecycle_ops::delete_object(&mut model, f.level_amount).unwrap();
    assert_eq!(model.get(f.level_qty).unwrap().ordinal(), Some(0));

    history_ops::undo(&mut model).unwrap();
    assert_eq!(model.get(f.level_amount).unwrap().ordinal(), Some(0));
    assert_eq!(model.get(f.level_qty).unwrap().ordinal(), Some(1));
    assert_eq!(model.metadata_index(f.level_qty), Some(1));
}

#[test]
fn test_deleting_culture_and_perspective_drop_their_entries() {
    let (mut model, f) = sales_model();

    lifecycle_ops::delete_object(&mut model, f.culture).unwrap();
    lifecycle_ops::delete_object(&mut model, f.perspective).unwrap();

    assert_eq!(
        model
            .graph()
            .translation(f.total, f.culture, TranslatedProperty::Caption),
        None
    );
    assert!(!model.graph().is_in_perspective(f.total, f.perspective));
    assert!(validate_model(&model).is_ok());

    history_ops::undo(&mut model).unwrap();
    history_ops::undo(&mut model).unwrap();
    assert_eq!(
        model
            .graph()
            .translation(f.total, f.culture, TranslatedProperty::Caption),
        Some("Summe")
    );
    assert!(model.graph().is_in_perspective(f.total, f.perspective));
}

#[test]
fn test_delete_of_deleted_or_unknown_object() {
    let (mut model, f) = sales_model();
    lifecycle_ops::delete_object(&mut model, f.double).unwrap();

    assert_eq!(
        lifecycle_ops::delete_object(&mut model, f.double),
        Err(ModelError::ObjectDeleted {
            object_id: f.double
        })
    );
    let unknown = tabmodel_core::ObjectId::new(9_999);
    assert_eq!(
        lifecycle_ops::delete_object(&mut model, unknown),
        Err(ModelError::ObjectNotFound { object_id: unknown })
    );
}

#[test]
fn test_root_cannot_be_deleted() {
    let mut model = Model::new();
    let root = model.root();
    assert!(matches!(
        lifecycle_ops::delete_object(&mut model, root),
        Err(ModelError::DeletionForbidden {
            kind: ObjectKind::Model,
            ..
        })
    ));
}

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::sales_model;
use tabmodel_core::ops::{create_ops, history_ops, lifecycle_ops};
use tabmodel_core::rules::{invariants, validation};
use tabmodel_core::Model;

// ===== VALIDATE_MODEL SUCCESS TESTS =====

#[test]
fn test_validate_succeeds_on_empty_model() {
    let model = Model::new();
    assert!(validation::validate_model(&model).is_ok());
}

#[test]
fn test_validate_succeeds_on_fixture() {
    let (model, _) = sales_model();
    assert!(validation::validate_model(&model).is_ok());
}

#[test]
fn test_validate_succeeds_after_delete_and_undo() {
    let (mut model, f) = sales_model();

    lifecycle_ops::delete_object(&mut model, f.sales).unwrap();
    assert!(validation::validate_model(&model).is_ok());

    history_ops::undo(&mut model).unwrap();
    assert!(validation::validate_model(&model).is_ok());
}

// ===== INDIVIDUAL INVARIANTS =====

#[test]
fn test_detached_objects_hold_no_references() {
    let (mut model, f) = sales_model();
    lifecycle_ops::delete_object(&mut model, f.total).unwrap();

    assert!(invariants::find_detached_with_references(&model).is_empty());
    assert!(invariants::find_edges_touching_detached(&model).is_empty());
}

#[test]
fn test_sibling_names_unique_after_reuse_of_deleted_name() {
    // GIVEN a deleted perspective whose name is taken again
    let mut model = Model::new();
    let first = create_ops::create_perspective(&mut model, "Finance").unwrap();
    lifecycle_ops::delete_object(&mut model, first).unwrap();
    let second = create_ops::create_perspective(&mut model, "finance").unwrap();

    // THEN only the live one counts
    assert_ne!(first, second);
    assert!(invariants::find_duplicate_sibling_names(&model).is_empty());
    assert!(validation::validate_model(&model).is_ok());
}

#[test]
fn test_levels_point_at_live_columns() {
    let (model, _) = sales_model();
    assert!(invariants::find_dangling_level_sources(&model).is_empty());
    assert!(invariants::find_membership_mismatches(&model).is_empty());
}

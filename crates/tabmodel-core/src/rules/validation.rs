use crate::errors::{ModelError, Result};
use crate::ops::Model;

use super::invariants;

/// Validate the structural integrity of the whole model
///
/// Runs every invariant check:
///
/// 1. Dependency edges are mutual (`DependsOn` ↔ `ReferencedBy`)
/// 2. No dependency edge touches a detached object
/// 3. Sibling names are unique within each collection
/// 4. Handle owner pointers agree with collection membership
/// 5. Detached objects carry no translations, memberships or entity tokens
/// 6. Every live level is built on a live column
///
/// # Errors
///
/// Returns the first violation as `IntegrityViolation`. For exhaustive
/// reporting call the individual functions in [`invariants`].
pub fn validate_model(model: &Model) -> Result<()> {
    if let Some((from, to)) = invariants::find_asymmetric_edges(model).first() {
        return Err(violation(format!(
            "dependency edge {} -> {} is not mirrored",
            from, to
        )));
    }

    if let Some((from, to)) = invariants::find_edges_touching_detached(model).first() {
        return Err(violation(format!(
            "dependency edge {} -> {} touches a detached object",
            from, to
        )));
    }

    if let Some((first, second)) = invariants::find_duplicate_sibling_names(model).first() {
        return Err(violation(format!(
            "siblings {} and {} share a name",
            first, second
        )));
    }

    if let Some(id) = invariants::find_membership_mismatches(model).first() {
        return Err(violation(format!(
            "{} disagrees with its collection membership",
            id
        )));
    }

    if let Some(id) = invariants::find_detached_with_references(model).first() {
        return Err(violation(format!(
            "detached object {} still carries references",
            id
        )));
    }

    if let Some(id) = invariants::find_dangling_level_sources(model).first() {
        return Err(violation(format!(
            "level {} is built on a missing column",
            id
        )));
    }

    Ok(())
}

fn violation(message: String) -> ModelError {
    ModelError::IntegrityViolation { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ReferenceInfo;
    use crate::ops::{create_ops, lifecycle_ops};

    #[test]
    fn test_fresh_model_is_valid() {
        let model = Model::new();
        assert!(validate_model(&model).is_ok());
    }

    #[test]
    fn test_edge_to_detached_object_is_reported() {
        let mut model = Model::new();
        let table = create_ops::create_table(&mut model, "Sales").unwrap();
        let total = create_ops::create_measure(&mut model, table, "Total", "1").unwrap();
        let other = create_ops::create_measure(&mut model, table, "Other", "1").unwrap();
        lifecycle_ops::delete_object(&mut model, other).unwrap();
        assert!(validate_model(&model).is_ok());

        // forge an edge the engine would never leave behind
        model
            .graph
            .add_dependency(total, other, ReferenceInfo::default());

        assert!(matches!(
            validate_model(&model),
            Err(ModelError::IntegrityViolation { .. })
        ));
        assert_eq!(
            invariants::find_edges_touching_detached(&model),
            vec![(total, other)]
        );
    }
}

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{live_names, sales_model, SalesFixture};
use proptest::prelude::*;
use tabmodel_core::ops::{dependency_ops, history_ops, lifecycle_ops};
use tabmodel_core::rules::validation::validate_model;
use tabmodel_core::{ModelError, ObjectId};

#[derive(Debug, Clone)]
enum Step {
    Delete(usize),
    Undo,
    Redo,
    Rebuild,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (0usize..10).prop_map(Step::Delete),
        2 => Just(Step::Undo),
        2 => Just(Step::Redo),
        1 => Just(Step::Rebuild),
    ]
}

fn targets(f: &SalesFixture) -> [ObjectId; 10] {
    [
        f.sales,
        f.amount,
        f.qty,
        f.total,
        f.double,
        f.hierarchy,
        f.level_amount,
        f.level_qty,
        f.perspective,
        f.culture,
    ]
}

proptest! {
    #[test]
    fn history_replay_preserves_integrity(steps in proptest::collection::vec(step_strategy(), 1..25)) {
        let (mut model, f) = sales_model();
        let targets = targets(&f);

        for step in steps {
            match step {
                Step::Delete(i) => match lifecycle_ops::delete_object(&mut model, targets[i]) {
                    Ok(_)
                    | Err(ModelError::DeletionForbidden { .. })
                    | Err(ModelError::ObjectDeleted { .. }) => {}
                    Err(other) => {
                        prop_assert!(false, "unexpected delete error: {}", other);
                    }
                },
                Step::Undo => {
                    prop_assert!(history_ops::undo(&mut model).is_ok());
                }
                Step::Redo => {
                    prop_assert!(history_ops::redo(&mut model).is_ok());
                }
                Step::Rebuild => {
                    dependency_ops::rebuild_dependencies(&mut model);
                }
            }
            prop_assert_eq!(validate_model(&model), Ok(()));
        }
    }

    #[test]
    fn undo_then_redo_returns_to_same_tree(deletes in proptest::collection::vec(0usize..10, 1..8)) {
        let (mut model, f) = sales_model();
        let targets = targets(&f);
        let mut applied = 0;
        for i in deletes {
            if lifecycle_ops::delete_object(&mut model, targets[i]).is_ok() {
                applied += 1;
            }
        }
        let after = live_names(&model);

        for _ in 0..applied {
            prop_assert!(history_ops::undo(&mut model).unwrap().is_some());
        }
        for _ in 0..applied {
            prop_assert!(history_ops::redo(&mut model).unwrap().is_some());
        }

        prop_assert_eq!(live_names(&model), after);
        prop_assert_eq!(validate_model(&model), Ok(()));
    }
}

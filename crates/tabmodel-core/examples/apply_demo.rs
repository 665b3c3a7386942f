//! Apply API Demonstration
//!
//! Builds a small tabular model through `apply()`, deletes a referenced
//! measure, undoes the delete and rebuilds the dependency graph.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use tabmodel_core::logging_facility::init;
use tabmodel_core::notify::{ChangeEvent, EventJournal};
use tabmodel_core::rules::validation::validate_model;
use tabmodel_core::{apply, Command, CommandOutcome, EngineConfig, Model, ObjectId};

const CONFIG: &str = r#"
[governance]
forbid_delete = ["Culture"]

[history]
max_depth = 50

[logging]
profile = "development"
"#;

fn created(outcome: CommandOutcome) -> ObjectId {
    match outcome {
        CommandOutcome::Created(id) => id,
        other => panic!("expected Created, got {:?}", other),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::from_toml_str(CONFIG)?;
    init(config.logging.profile);

    println!("=== Tabular Model Apply Demo ===\n");

    let mut model = Model::with_config(&config);
    let journal = EventJournal::new();
    model.subscribe(journal.listener());

    // ===== Part 1: Build =====
    println!("## Part 1: Build\n");

    let sales = created(apply(
        &mut model,
        Command::CreateTable {
            name: "Sales".to_string(),
        },
    )?);
    let amount = created(apply(
        &mut model,
        Command::CreateColumn {
            table: sales,
            name: "Amount".to_string(),
            expression: None,
        },
    )?);
    let total = created(apply(
        &mut model,
        Command::CreateMeasure {
            table: sales,
            name: "Total".to_string(),
            expression: "SUM(Sales[Amount])".to_string(),
        },
    )?);
    let double = created(apply(
        &mut model,
        Command::CreateMeasure {
            table: sales,
            name: "Double".to_string(),
            expression: "[Total] * 2".to_string(),
        },
    )?);
    let culture = created(apply(
        &mut model,
        Command::CreateCulture {
            name: "de-DE".to_string(),
        },
    )?);

    println!(
        "✓ Table {} with column {} and measures {}, {}",
        sales, amount, total, double
    );
    println!("  Edges: {:?}\n", model.graph().edges());

    // ===== Part 2: Delete and undo =====
    println!("## Part 2: Delete and undo\n");

    let deleted = apply(&mut model, Command::Delete { object: total })?;
    if let CommandOutcome::Deleted(outcome) = deleted {
        println!("✓ Deleted Total: {:?}", outcome);
    }
    println!("  Edges after delete: {:?}", model.graph().edges());

    apply(&mut model, Command::Undo)?;
    println!("✓ Undone; Total live again: {}", model.is_live(total));
    println!("  Edges before rebuild: {:?}", model.graph().edges());

    if let CommandOutcome::Rebuilt(report) = apply(&mut model, Command::RebuildDependencies)? {
        println!(
            "✓ Rebuilt: {} objects visited, {} edges\n",
            report.visited, report.edges
        );
    }

    // ===== Part 3: Governance =====
    println!("## Part 3: Governance\n");

    match apply(&mut model, Command::Delete { object: culture }) {
        Ok(_) => println!("✗ Culture deleted unexpectedly"),
        Err(err) => println!("✓ Refused: {}", err),
    }

    // ===== Summary =====
    validate_model(&model)?;
    let removals = journal
        .events()
        .iter()
        .filter(|e| matches!(e, ChangeEvent::NodeRemoved { .. }))
        .count();
    println!(
        "\nModel valid; {} events published ({} removals), {} undoable batches",
        journal.len(),
        removals,
        model.history().undo_depth()
    );

    Ok(())
}

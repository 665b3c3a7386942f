use tabmodel_core::graph::TranslatedProperty;
use tabmodel_core::notify::EventJournal;
use tabmodel_core::ops::{create_ops, reference_ops};
use tabmodel_core::{Model, ObjectId};

/// Ids of the objects in the standard sales fixture
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub struct SalesFixture {
    pub sales: ObjectId,
    pub amount: ObjectId,
    pub qty: ObjectId,
    pub total: ObjectId,
    pub double: ObjectId,
    pub hierarchy: ObjectId,
    pub level_amount: ObjectId,
    pub level_qty: ObjectId,
    pub perspective: ObjectId,
    pub culture: ObjectId,
}

/// Build the standard sales model
///
/// - table `Sales` with columns `Amount` and `Qty`
/// - measure `Total = SUM(Sales[Amount])` and `Double = [Total] * 2`
/// - hierarchy `Breakdown` with levels on `Amount` and `Qty`
/// - perspective `Finance` containing `Total`
/// - culture `de-DE` translating the caption of `Total`
#[allow(dead_code)]
pub fn sales_model() -> (Model, SalesFixture) {
    let mut model = Model::new();
    let fixture = populate(&mut model);
    (model, fixture)
}

/// Populate an existing model with the sales fixture
#[allow(dead_code)]
pub fn populate(model: &mut Model) -> SalesFixture {
    let sales = create_ops::create_table(model, "Sales").unwrap();
    let amount = create_ops::create_column(model, sales, "Amount", None).unwrap();
    let qty = create_ops::create_column(model, sales, "Qty", None).unwrap();
    let total = create_ops::create_measure(model, sales, "Total", "SUM(Sales[Amount])").unwrap();
    let double = create_ops::create_measure(model, sales, "Double", "[Total] * 2").unwrap();
    let hierarchy = create_ops::create_hierarchy(model, sales, "Breakdown").unwrap();
    let level_amount = create_ops::create_level(model, hierarchy, "By Amount", amount).unwrap();
    let level_qty = create_ops::create_level(model, hierarchy, "By Qty", qty).unwrap();
    let perspective = create_ops::create_perspective(model, "Finance").unwrap();
    let culture = create_ops::create_culture(model, "de-DE").unwrap();

    reference_ops::set_perspective_membership(model, total, perspective, true).unwrap();
    reference_ops::set_translation(
        model,
        total,
        culture,
        TranslatedProperty::Caption,
        Some("Summe".to_string()),
    )
    .unwrap();

    SalesFixture {
        sales,
        amount,
        qty,
        total,
        double,
        hierarchy,
        level_amount,
        level_qty,
        perspective,
        culture,
    }
}

/// Subscribe a fresh journal to the model
#[allow(dead_code)]
pub fn journal(model: &mut Model) -> EventJournal {
    let journal = EventJournal::new();
    model.subscribe(journal.listener());
    journal
}

/// Names of the live objects in tree order, for whole-model comparisons
#[allow(dead_code)]
pub fn live_names(model: &Model) -> Vec<String> {
    model
        .live_objects()
        .into_iter()
        .map(|id| model.get(id).unwrap().name().to_string())
        .collect()
}

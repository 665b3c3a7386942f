//! Model context and the operations that mutate it
//!
//! Operations are free functions over `&mut Model`, grouped by concern.

pub mod collection_ops;
pub mod create_ops;
pub mod dependency_ops;
pub mod history_ops;
pub mod lifecycle_ops;
pub mod model;
pub mod property_ops;
pub mod reference_ops;

pub use dependency_ops::RebuildReport;
pub use lifecycle_ops::{DeleteOutcome, RenameOutcome};
pub use model::Model;

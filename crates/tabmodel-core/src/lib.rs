//! TabModel Core - named-object lifecycle and reference-integrity engine
//!
//! This crate manages the objects of a hierarchical tabular model (tables,
//! columns, measures, hierarchies, levels, perspectives, cultures) and keeps
//! three auxiliary structures consistent while they are created, deleted,
//! undeleted and renamed:
//! - an undo/redo transaction log with nested, atomically replayed batches
//! - a reference graph (formula dependencies, perspective membership,
//!   translations) with mutual dependency edges
//! - a synchronous change-notification stream for tree views
//!
//! Everything hangs off one [`Model`] per open document.

pub mod apply;
pub mod behavior;
pub mod commands;
pub mod config;
pub mod errors;
pub mod formula;
pub mod graph;
pub mod history;
pub mod logging_facility;
pub mod model;
pub mod notify;
pub mod ops;
pub mod policy;
pub mod rules;

// Re-export commonly used types
pub use apply::apply;
pub use commands::{Command, CommandOutcome};
pub use config::EngineConfig;
pub use errors::{ExError, ExErrorKind, ModelError, Result};
pub use model::{ChildKind, CollectionRef, ObjectId, ObjectKind};
pub use ops::Model;
pub use policy::{AllowAllPolicy, GovernancePolicy, RestrictedKindsPolicy};

#[doc(hidden)]
pub use tabmodel_core_types::schema as __schema;
#[doc(hidden)]
pub use tracing as __tracing;

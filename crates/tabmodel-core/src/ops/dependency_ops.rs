//! Formula dependency maintenance
//!
//! Dependency edges are derived data. [`rebuild_dependencies`] throws the
//! whole edge set away and recomputes it from the current formula text;
//! it is idempotent and never recorded in the undo log.

use std::collections::BTreeMap;

use crate::errors::Result;
use crate::formula::aggregate;
use crate::graph::ReferenceInfo;
use crate::model::{Facet, ObjectId};

use super::Model;

/// Statistics from a full rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RebuildReport {
    /// Live objects walked
    pub visited: usize,
    /// Dependency edges after the rebuild
    pub edges: usize,
}

/// Outgoing edges `id` should have according to its formula
///
/// Only live dependency targets other than `id` itself qualify.
fn compute_dependencies(model: &Model, id: ObjectId) -> BTreeMap<ObjectId, ReferenceInfo> {
    let Ok(handle) = model.get(id) else {
        return BTreeMap::new();
    };
    let Some(expression) = handle
        .expression()
        .filter(|_| handle.supports(Facet::FormulaBearing) && model.is_live(id))
    else {
        return BTreeMap::new();
    };

    let references: Vec<_> = model
        .resolver
        .resolve(model, id, expression)
        .into_iter()
        .filter(|r| {
            r.target != id
                && model.is_live(r.target)
                && model
                    .get(r.target)
                    .is_ok_and(|t| t.supports(Facet::DependencyTarget))
        })
        .collect();
    aggregate(&references)
}

/// Recompute the outgoing edges of one object
///
/// Returns the number of objects `id` now depends on.
///
/// # Errors
///
/// Returns `ObjectNotFound` for unknown ids.
pub fn refresh_dependencies(model: &mut Model, id: ObjectId) -> Result<usize> {
    model.get(id)?;
    let deps = compute_dependencies(model, id);
    let count = deps.len();
    model.graph.set_dependencies(id, deps);
    Ok(count)
}

/// Discard every dependency edge and recompute them from formula text
///
/// Walks the live tree depth-first from the root. Edges touching detached
/// objects disappear; edges of undeleted objects come back.
pub fn rebuild_dependencies(model: &mut Model) -> RebuildReport {
    model.graph.clear_dependencies();
    let live = model.live_objects();
    let visited = live.len();

    for id in live {
        let deps = compute_dependencies(model, id);
        if !deps.is_empty() {
            model.graph.set_dependencies(id, deps);
        }
    }

    let report = RebuildReport {
        visited,
        edges: model.graph.edge_count(),
    };
    tracing::info!(
        visited = report.visited,
        edge_count = report.edges,
        "dependency graph rebuilt"
    );
    report
}

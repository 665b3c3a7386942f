use serde::{Deserialize, Serialize};

use super::facet::{Facet, FacetSet};

/// Kind of a domain entity in the tabular schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Document root; exactly one per model
    Model,
    Table,
    Column,
    Measure,
    Hierarchy,
    Level,
    Perspective,
    Culture,
}

impl ObjectKind {
    /// Human-readable label used in batch names and messages
    pub fn label(&self) -> &'static str {
        match self {
            ObjectKind::Model => "Model",
            ObjectKind::Table => "Table",
            ObjectKind::Column => "Column",
            ObjectKind::Measure => "Measure",
            ObjectKind::Hierarchy => "Hierarchy",
            ObjectKind::Level => "Level",
            ObjectKind::Perspective => "Perspective",
            ObjectKind::Culture => "Culture",
        }
    }

    /// Child collections an object of this kind owns, in tree order
    pub fn owned_collections(&self) -> &'static [ChildKind] {
        match self {
            ObjectKind::Model => &[ChildKind::Tables, ChildKind::Perspectives, ChildKind::Cultures],
            ObjectKind::Table => &[ChildKind::Columns, ChildKind::Measures, ChildKind::Hierarchies],
            ObjectKind::Hierarchy => &[ChildKind::Levels],
            _ => &[],
        }
    }

    /// Whether this kind owns the given child collection
    pub fn owns(&self, child_kind: ChildKind) -> bool {
        self.owned_collections().contains(&child_kind)
    }

    /// Collection kind that holds objects of this kind (None for the root)
    pub fn member_of(&self) -> Option<ChildKind> {
        match self {
            ObjectKind::Model => None,
            ObjectKind::Table => Some(ChildKind::Tables),
            ObjectKind::Column => Some(ChildKind::Columns),
            ObjectKind::Measure => Some(ChildKind::Measures),
            ObjectKind::Hierarchy => Some(ChildKind::Hierarchies),
            ObjectKind::Level => Some(ChildKind::Levels),
            ObjectKind::Perspective => Some(ChildKind::Perspectives),
            ObjectKind::Culture => Some(ChildKind::Cultures),
        }
    }

    /// Facets every object of this kind carries from construction
    ///
    /// Calculated columns additionally get `FormulaBearing` when created with
    /// an expression.
    pub fn default_facets(&self) -> FacetSet {
        match self {
            ObjectKind::Table => FacetSet::EMPTY
                .with(Facet::Translatable)
                .with(Facet::PerspectiveAware)
                .with(Facet::DependencyTarget),
            ObjectKind::Column => FacetSet::EMPTY
                .with(Facet::Translatable)
                .with(Facet::PerspectiveAware)
                .with(Facet::DependencyTarget),
            ObjectKind::Measure => FacetSet::EMPTY
                .with(Facet::Translatable)
                .with(Facet::PerspectiveAware)
                .with(Facet::FormulaBearing)
                .with(Facet::DependencyTarget),
            ObjectKind::Hierarchy => FacetSet::EMPTY
                .with(Facet::Translatable)
                .with(Facet::PerspectiveAware),
            ObjectKind::Level => FacetSet::EMPTY.with(Facet::Translatable),
            ObjectKind::Model | ObjectKind::Perspective | ObjectKind::Culture => FacetSet::EMPTY,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of an owned child collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChildKind {
    Tables,
    Columns,
    Measures,
    Hierarchies,
    Levels,
    Perspectives,
    Cultures,
}

impl ChildKind {
    /// Kind of the objects stored in a collection of this kind
    pub fn member_kind(&self) -> ObjectKind {
        match self {
            ChildKind::Tables => ObjectKind::Table,
            ChildKind::Columns => ObjectKind::Column,
            ChildKind::Measures => ObjectKind::Measure,
            ChildKind::Hierarchies => ObjectKind::Hierarchy,
            ChildKind::Levels => ObjectKind::Level,
            ChildKind::Perspectives => ObjectKind::Perspective,
            ChildKind::Cultures => ObjectKind::Culture,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChildKind::Tables => "Tables",
            ChildKind::Columns => "Columns",
            ChildKind::Measures => "Measures",
            ChildKind::Hierarchies => "Hierarchies",
            ChildKind::Levels => "Levels",
            ChildKind::Perspectives => "Perspectives",
            ChildKind::Cultures => "Cultures",
        }
    }
}

impl std::fmt::Display for ChildKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

//! Optional capabilities attached to objects at construction

use serde::{Deserialize, Serialize};

/// A capability an object kind may or may not support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facet {
    /// Carries per-culture caption/description/display-folder strings
    Translatable,
    /// Can be included in perspectives
    PerspectiveAware,
    /// Has a formula whose references form `DependsOn` edges
    FormulaBearing,
    /// Can be referenced from formulas (`ReferencedBy` edges)
    DependencyTarget,
}

impl Facet {
    const ALL: [Facet; 4] = [
        Facet::Translatable,
        Facet::PerspectiveAware,
        Facet::FormulaBearing,
        Facet::DependencyTarget,
    ];

    fn bit(self) -> u8 {
        match self {
            Facet::Translatable => 1,
            Facet::PerspectiveAware => 1 << 1,
            Facet::FormulaBearing => 1 << 2,
            Facet::DependencyTarget => 1 << 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Facet::Translatable => "translatable",
            Facet::PerspectiveAware => "perspective-aware",
            Facet::FormulaBearing => "formula-bearing",
            Facet::DependencyTarget => "dependency-target",
        }
    }
}

/// Fixed set of facets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FacetSet(u8);

impl FacetSet {
    pub const EMPTY: FacetSet = FacetSet(0);

    /// Return a copy of this set with `facet` added
    pub fn with(self, facet: Facet) -> Self {
        Self(self.0 | facet.bit())
    }

    pub fn contains(&self, facet: Facet) -> bool {
        self.0 & facet.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Facet> + '_ {
        Facet::ALL.into_iter().filter(|f| self.contains(*f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_and_contains() {
        let set = FacetSet::EMPTY.with(Facet::Translatable);
        assert!(set.contains(Facet::Translatable));
        assert!(!set.contains(Facet::FormulaBearing));
        assert!(!set.is_empty());
        assert!(FacetSet::EMPTY.is_empty());
    }

    #[test]
    fn test_iter_in_declaration_order() {
        let set = FacetSet::EMPTY
            .with(Facet::DependencyTarget)
            .with(Facet::Translatable);
        let facets: Vec<_> = set.iter().collect();
        assert_eq!(facets, vec![Facet::Translatable, Facet::DependencyTarget]);
    }
}

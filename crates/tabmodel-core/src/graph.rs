//! Bidirectional reference edges between model objects
//!
//! Three kinds of edges are tracked, all keyed by stable [`ObjectId`]s rather
//! than owning references:
//! - perspective membership (object -> perspectives it is included in)
//! - translations (object -> culture/property -> localized string)
//! - formula dependencies (`DependsOn` / `ReferencedBy`), always mutual

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::ObjectId;

/// Translatable string property of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TranslatedProperty {
    Caption,
    Description,
    DisplayFolder,
}

/// Metadata about one formula reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReferenceInfo {
    /// Number of times the target occurs in the formula
    pub occurrences: u32,
    /// Byte offset of the first occurrence
    pub first_offset: usize,
    /// Whether the first occurrence was table-qualified
    pub qualified: bool,
}

/// One localized string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    pub culture: ObjectId,
    pub property: TranslatedProperty,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceGraph {
    depends_on: HashMap<ObjectId, BTreeMap<ObjectId, ReferenceInfo>>,
    referenced_by: HashMap<ObjectId, BTreeSet<ObjectId>>,
    perspectives: HashMap<ObjectId, BTreeSet<ObjectId>>,
    translations: HashMap<ObjectId, BTreeMap<(ObjectId, TranslatedProperty), String>>,
}

impl ReferenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Dependency edges =====

    /// Objects `id` depends on, in id order
    pub fn dependencies(&self, id: ObjectId) -> Vec<ObjectId> {
        self.depends_on
            .get(&id)
            .map(|deps| deps.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Reference metadata for the edge `from -> to`
    pub fn dependency(&self, from: ObjectId, to: ObjectId) -> Option<&ReferenceInfo> {
        self.depends_on.get(&from).and_then(|deps| deps.get(&to))
    }

    /// Objects whose formulas reference `id`, in id order
    pub fn dependants(&self, id: ObjectId) -> Vec<ObjectId> {
        self.referenced_by
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether `id` appears on either side of any dependency edge
    pub fn has_dependency_edges(&self, id: ObjectId) -> bool {
        self.depends_on.get(&id).is_some_and(|d| !d.is_empty())
            || self.referenced_by.get(&id).is_some_and(|r| !r.is_empty())
    }

    /// Add or replace the edge `from -> to`, keeping both directions in sync
    pub fn add_dependency(&mut self, from: ObjectId, to: ObjectId, info: ReferenceInfo) {
        self.depends_on.entry(from).or_default().insert(to, info);
        self.referenced_by.entry(to).or_default().insert(from);
    }

    /// Remove the edge `from -> to`; returns whether it existed
    pub fn remove_dependency(&mut self, from: ObjectId, to: ObjectId) -> bool {
        let removed = match self.depends_on.get_mut(&from) {
            Some(deps) => deps.remove(&to).is_some(),
            None => false,
        };
        if let Some(deps) = self.depends_on.get(&from) {
            if deps.is_empty() {
                self.depends_on.remove(&from);
            }
        }
        if let Some(dependants) = self.referenced_by.get_mut(&to) {
            dependants.remove(&from);
            if dependants.is_empty() {
                self.referenced_by.remove(&to);
            }
        }
        removed
    }

    /// Replace every outgoing edge of `from`
    pub fn set_dependencies(&mut self, from: ObjectId, deps: BTreeMap<ObjectId, ReferenceInfo>) {
        for old in self.dependencies(from) {
            self.remove_dependency(from, old);
        }
        for (to, info) in deps {
            self.add_dependency(from, to, info);
        }
    }

    /// Remove every edge touching `id` in both directions; returns the number
    /// of edges removed
    pub fn sever_dependencies(&mut self, id: ObjectId) -> usize {
        let mut removed = 0;
        for target in self.dependencies(id) {
            if self.remove_dependency(id, target) {
                removed += 1;
            }
        }
        for dependant in self.dependants(id) {
            if self.remove_dependency(dependant, id) {
                removed += 1;
            }
        }
        removed
    }

    /// Drop every dependency edge in the graph
    pub fn clear_dependencies(&mut self) {
        self.depends_on.clear();
        self.referenced_by.clear();
    }

    pub fn edge_count(&self) -> usize {
        self.depends_on.values().map(|deps| deps.len()).sum()
    }

    /// All `(from, to)` edges as recorded on the `DependsOn` side
    pub fn edges(&self) -> Vec<(ObjectId, ObjectId)> {
        let mut edges: Vec<_> = self
            .depends_on
            .iter()
            .flat_map(|(from, deps)| deps.keys().map(move |to| (*from, *to)))
            .collect();
        edges.sort();
        edges
    }

    /// All `(from, to)` edges as recorded on the `ReferencedBy` side
    pub fn reverse_edges(&self) -> Vec<(ObjectId, ObjectId)> {
        let mut edges: Vec<_> = self
            .referenced_by
            .iter()
            .flat_map(|(to, froms)| froms.iter().map(move |from| (*from, *to)))
            .collect();
        edges.sort();
        edges
    }

    // ===== Perspective membership =====

    /// Perspectives `id` is included in
    pub fn perspectives_of(&self, id: ObjectId) -> Vec<ObjectId> {
        self.perspectives
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_in_perspective(&self, id: ObjectId, perspective: ObjectId) -> bool {
        self.perspectives
            .get(&id)
            .is_some_and(|set| set.contains(&perspective))
    }

    /// Include or exclude `id`; returns whether membership changed
    pub fn set_membership(&mut self, id: ObjectId, perspective: ObjectId, included: bool) -> bool {
        if included {
            self.perspectives.entry(id).or_default().insert(perspective)
        } else {
            let changed = self
                .perspectives
                .get_mut(&id)
                .is_some_and(|set| set.remove(&perspective));
            if self.perspectives.get(&id).is_some_and(|set| set.is_empty()) {
                self.perspectives.remove(&id);
            }
            changed
        }
    }

    /// Remove all memberships of `id`, returning what was removed
    pub fn clear_perspectives(&mut self, id: ObjectId) -> Vec<ObjectId> {
        self.perspectives
            .remove(&id)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default()
    }

    /// Objects included in `perspective`, in id order
    pub fn members_of(&self, perspective: ObjectId) -> Vec<ObjectId> {
        let mut members: Vec<_> = self
            .perspectives
            .iter()
            .filter(|(_, set)| set.contains(&perspective))
            .map(|(id, _)| *id)
            .collect();
        members.sort();
        members
    }

    /// Objects that carry at least one perspective membership
    pub fn perspective_holders(&self) -> Vec<ObjectId> {
        let mut holders: Vec<_> = self.perspectives.keys().copied().collect();
        holders.sort();
        holders
    }

    // ===== Translations =====

    pub fn translation(
        &self,
        id: ObjectId,
        culture: ObjectId,
        property: TranslatedProperty,
    ) -> Option<&str> {
        self.translations
            .get(&id)
            .and_then(|map| map.get(&(culture, property)))
            .map(String::as_str)
    }

    /// Set or clear (`None`) one translation; returns the previous value
    pub fn set_translation(
        &mut self,
        id: ObjectId,
        culture: ObjectId,
        property: TranslatedProperty,
        value: Option<String>,
    ) -> Option<String> {
        match value {
            Some(value) => self
                .translations
                .entry(id)
                .or_default()
                .insert((culture, property), value),
            None => {
                let old = self
                    .translations
                    .get_mut(&id)
                    .and_then(|map| map.remove(&(culture, property)));
                if self.translations.get(&id).is_some_and(|map| map.is_empty()) {
                    self.translations.remove(&id);
                }
                old
            }
        }
    }

    /// Every translation of `id`
    pub fn translations_of(&self, id: ObjectId) -> Vec<TranslationEntry> {
        self.translations
            .get(&id)
            .map(|map| {
                map.iter()
                    .map(|((culture, property), value)| TranslationEntry {
                        culture: *culture,
                        property: *property,
                        value: value.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Remove every translation of `id`, returning what was removed
    pub fn clear_translations(&mut self, id: ObjectId) -> Vec<TranslationEntry> {
        let entries = self.translations_of(id);
        self.translations.remove(&id);
        entries
    }

    /// Every `(object, entry)` pair keyed by `culture`
    pub fn translations_for_culture(&self, culture: ObjectId) -> Vec<(ObjectId, TranslationEntry)> {
        let mut found: Vec<_> = self
            .translations
            .iter()
            .flat_map(|(id, map)| {
                map.iter()
                    .filter(|((c, _), _)| *c == culture)
                    .map(|((c, property), value)| {
                        (
                            *id,
                            TranslationEntry {
                                culture: *c,
                                property: *property,
                                value: value.clone(),
                            },
                        )
                    })
            })
            .collect();
        found.sort_by(|a, b| (a.0, a.1.property).cmp(&(b.0, b.1.property)));
        found
    }

    /// Objects that carry at least one translation
    pub fn translation_holders(&self) -> Vec<ObjectId> {
        let mut holders: Vec<_> = self.translations.keys().copied().collect();
        holders.sort();
        holders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> ObjectId {
        ObjectId::new(raw)
    }

    #[test]
    fn test_edges_are_mutual() {
        let mut graph = ReferenceGraph::new();
        graph.add_dependency(id(1), id(2), ReferenceInfo::default());

        assert_eq!(graph.dependencies(id(1)), vec![id(2)]);
        assert_eq!(graph.dependants(id(2)), vec![id(1)]);
        assert_eq!(graph.edges(), graph.reverse_edges());
    }

    #[test]
    fn test_sever_removes_both_directions() {
        let mut graph = ReferenceGraph::new();
        graph.add_dependency(id(1), id(2), ReferenceInfo::default());
        graph.add_dependency(id(2), id(3), ReferenceInfo::default());
        graph.add_dependency(id(4), id(2), ReferenceInfo::default());

        assert_eq!(graph.sever_dependencies(id(2)), 3);
        assert!(!graph.has_dependency_edges(id(2)));
        assert!(graph.dependencies(id(1)).is_empty());
        assert!(graph.dependants(id(3)).is_empty());
        assert_eq!(graph.dependency(id(1), id(2)), None);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_set_dependencies_replaces_outgoing() {
        let mut graph = ReferenceGraph::new();
        graph.add_dependency(id(1), id(2), ReferenceInfo::default());

        let mut deps = BTreeMap::new();
        deps.insert(
            id(3),
            ReferenceInfo {
                occurrences: 2,
                first_offset: 4,
                qualified: true,
            },
        );
        graph.set_dependencies(id(1), deps);

        assert_eq!(graph.dependencies(id(1)), vec![id(3)]);
        assert!(graph.dependants(id(2)).is_empty());
        assert_eq!(graph.dependency(id(1), id(3)).map(|i| i.occurrences), Some(2));
    }

    #[test]
    fn test_perspective_membership() {
        let mut graph = ReferenceGraph::new();
        assert!(graph.set_membership(id(5), id(100), true));
        assert!(!graph.set_membership(id(5), id(100), true));
        assert!(graph.set_membership(id(6), id(100), true));

        assert_eq!(graph.members_of(id(100)), vec![id(5), id(6)]);
        assert_eq!(graph.clear_perspectives(id(5)), vec![id(100)]);
        assert!(!graph.is_in_perspective(id(5), id(100)));
        assert!(graph.set_membership(id(6), id(100), false));
        assert!(graph.perspective_holders().is_empty());
    }

    #[test]
    fn test_translations_by_culture() {
        let mut graph = ReferenceGraph::new();
        let fr = id(200);
        let de = id(201);
        graph.set_translation(id(5), fr, TranslatedProperty::Caption, Some("Ventes".into()));
        graph.set_translation(id(5), de, TranslatedProperty::Caption, Some("Umsatz".into()));
        graph.set_translation(id(6), fr, TranslatedProperty::Description, Some("Desc".into()));

        let french = graph.translations_for_culture(fr);
        assert_eq!(french.len(), 2);
        assert_eq!(
            graph.translation(id(5), de, TranslatedProperty::Caption),
            Some("Umsatz")
        );

        let old = graph.set_translation(id(5), de, TranslatedProperty::Caption, None);
        assert_eq!(old.as_deref(), Some("Umsatz"));

        let cleared = graph.clear_translations(id(5));
        assert_eq!(cleared.len(), 1);
        assert_eq!(graph.translation_holders(), vec![id(6)]);
    }
}

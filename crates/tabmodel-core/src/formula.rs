//! Formula reference resolution
//!
//! The engine never evaluates formulas. It only needs to know which objects a
//! formula text names so the dependency graph can be rebuilt. Resolution is
//! pluggable through [`FormulaResolver`]; [`BracketReferenceResolver`]
//! understands the common bracket syntax:
//!
//! - `'Table Name'[Member]` and `Table[Member]` (qualified column or measure)
//! - `'Table Name'` (whole table)
//! - `[Member]` (a measure anywhere, else a column of the owner's table)
//!
//! Text inside double-quoted string literals is ignored.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::graph::ReferenceInfo;
use crate::model::ObjectId;
use crate::ops::Model;

/// One reference found in a formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedReference {
    pub target: ObjectId,
    /// Byte offset of the reference in the formula text
    pub offset: usize,
    /// Whether the reference named its table explicitly
    pub qualified: bool,
}

/// Maps formula text to the objects it references
pub trait FormulaResolver {
    /// Resolve every reference in `expression`, owned by `owner`
    ///
    /// Unknown names are skipped. The result may contain duplicates and
    /// references to objects that cannot be dependency targets; callers
    /// filter.
    fn resolve(&self, model: &Model, owner: ObjectId, expression: &str) -> Vec<ResolvedReference>;
}

/// Fold resolved references into one [`ReferenceInfo`] per target
pub fn aggregate(references: &[ResolvedReference]) -> BTreeMap<ObjectId, ReferenceInfo> {
    let mut map: BTreeMap<ObjectId, ReferenceInfo> = BTreeMap::new();
    for reference in references {
        map.entry(reference.target)
            .and_modify(|info| {
                info.occurrences += 1;
                info.first_offset = info.first_offset.min(reference.offset);
                info.qualified |= reference.qualified;
            })
            .or_insert(ReferenceInfo {
                occurrences: 1,
                first_offset: reference.offset,
                qualified: reference.qualified,
            });
    }
    map
}

fn reference_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r#"(?x)
                (?P<string>"(?:[^"]|"")*")
                | '(?P<quoted>(?:[^']|'')+)'(?:\[(?P<qmember>[^\]]+)\])?
                | (?P<table>[A-Za-z_][A-Za-z0-9_]*)\[(?P<tmember>[^\]]+)\]
                | \[(?P<member>[^\]]+)\]
                "#,
            )
            .map_err(|e| tracing::error!(error = %e, "invalid formula reference pattern"))
            .ok()
        })
        .as_ref()
}

/// Resolver for bracket-style formula references
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketReferenceResolver;

impl BracketReferenceResolver {
    pub fn new() -> Self {
        Self
    }

    fn qualified(model: &Model, table: &str, member: Option<&str>) -> Option<ObjectId> {
        let table_id = model.find_table(table)?;
        match member {
            Some(member) => model.find_member(table_id, member.trim()),
            None => Some(table_id),
        }
    }

    fn unqualified(model: &Model, owner: ObjectId, member: &str) -> Option<ObjectId> {
        let member = member.trim();
        model.find_measure(member).or_else(|| {
            model
                .owning_table(owner)
                .and_then(|table| model.find_member(table, member))
        })
    }
}

impl FormulaResolver for BracketReferenceResolver {
    fn resolve(&self, model: &Model, owner: ObjectId, expression: &str) -> Vec<ResolvedReference> {
        let mut found = Vec::new();
        let Some(pattern) = reference_pattern() else {
            return found;
        };
        for caps in pattern.captures_iter(expression) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if caps.name("string").is_some() {
                continue;
            }

            let (target, qualified) = if let Some(quoted) = caps.name("quoted") {
                let table = quoted.as_str().replace("''", "'");
                let member = caps.name("qmember").map(|m| m.as_str());
                (Self::qualified(model, &table, member), true)
            } else if let (Some(table), Some(member)) = (caps.name("table"), caps.name("tmember")) {
                (
                    Self::qualified(model, table.as_str(), Some(member.as_str())),
                    true,
                )
            } else if let Some(member) = caps.name("member") {
                (Self::unqualified(model, owner, member.as_str()), false)
            } else {
                (None, false)
            };

            if let Some(target) = target {
                found.push(ResolvedReference {
                    target,
                    offset: whole.start(),
                    qualified,
                });
            }
        }
        found
    }
}

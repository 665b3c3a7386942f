//! Governance policy trait and implementations
//!
//! This module defines the `GovernancePolicy` trait, a yes/no gate consulted
//! once per delete before any state changes.

use std::collections::HashSet;

use crate::config::GovernanceConfig;
use crate::model::ObjectKind;

/// Policy trait deciding whether objects of a kind may be deleted
///
/// The policy is injected into the model context and consulted by
/// `can_delete`. It must not have side effects.
pub trait GovernancePolicy {
    /// Check if objects of `kind` may be deleted
    ///
    /// # Returns
    /// * `true` - deletion may proceed to the object's own checks
    /// * `false` - deletion is forbidden
    fn allow_delete(&self, kind: ObjectKind) -> bool;

    /// Message shown to the user when `allow_delete` returns false
    fn denial_reason(&self, kind: ObjectKind) -> String {
        format!("deleting {} objects is disabled by governance policy", kind)
    }
}

/// Policy that permits deleting every kind
///
/// # Example
/// ```
/// use tabmodel_core::policy::{AllowAllPolicy, GovernancePolicy};
/// use tabmodel_core::model::ObjectKind;
///
/// let policy = AllowAllPolicy;
/// assert!(policy.allow_delete(ObjectKind::Table));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllPolicy;

impl GovernancePolicy for AllowAllPolicy {
    fn allow_delete(&self, _kind: ObjectKind) -> bool {
        true
    }
}

/// Policy that forbids deleting an explicit set of kinds
///
/// # Example
/// ```
/// use tabmodel_core::policy::{GovernancePolicy, RestrictedKindsPolicy};
/// use tabmodel_core::model::ObjectKind;
///
/// let policy = RestrictedKindsPolicy::new([ObjectKind::Perspective]);
/// assert!(!policy.allow_delete(ObjectKind::Perspective));
/// assert!(policy.allow_delete(ObjectKind::Measure));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RestrictedKindsPolicy {
    forbidden: HashSet<ObjectKind>,
}

impl RestrictedKindsPolicy {
    pub fn new(forbidden: impl IntoIterator<Item = ObjectKind>) -> Self {
        Self {
            forbidden: forbidden.into_iter().collect(),
        }
    }

    pub fn from_config(config: &GovernanceConfig) -> Self {
        Self::new(config.forbid_delete.iter().copied())
    }

    pub fn is_restricted(&self, kind: ObjectKind) -> bool {
        self.forbidden.contains(&kind)
    }
}

impl GovernancePolicy for RestrictedKindsPolicy {
    fn allow_delete(&self, kind: ObjectKind) -> bool {
        !self.forbidden.contains(&kind)
    }
}

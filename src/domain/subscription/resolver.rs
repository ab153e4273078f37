//! Entitlement resolution.
//!
//! Turns the set of entitlement labels the commerce backend reports as active
//! into exactly one plan tier. Pure: no I/O, no shared state.
//!
//! When several recognized labels are active at once (an upgrade still inside
//! the old billing period, or overlapping family-shared grants), the tier with
//! the highest limit wins.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{registry, PlanTier};

/// Entitlement labels currently active for one identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActiveEntitlements(BTreeSet<String>);

impl ActiveEntitlements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>) -> bool {
        self.0.insert(label.into())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ActiveEntitlements {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// The tier derived from an entitlement set, with its room limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub tier: PlanTier,
    pub limit: u32,
}

impl ReconciliationResult {
    pub fn for_tier(tier: PlanTier) -> Self {
        Self {
            tier,
            limit: registry::limit_of(tier),
        }
    }

    /// The result for a user with no recognized entitlement.
    pub fn none() -> Self {
        Self::for_tier(PlanTier::None)
    }

    /// Identifier written to the profile's plan field.
    pub fn plan_identifier(&self) -> &'static str {
        self.tier.identifier()
    }
}

impl Default for ReconciliationResult {
    fn default() -> Self {
        Self::none()
    }
}

/// Resolves the active entitlement set to a single tier.
///
/// Labels are checked against the registry's priority list from Tier1 up to
/// Tier5; every match is kept and the highest one is returned. Labels the
/// registry does not know are ignored.
pub fn resolve(active: &ActiveEntitlements) -> ReconciliationResult {
    let tier = registry::all()
        .iter()
        .copied()
        .filter(|tier| {
            tier.entitlement_label()
                .map(|label| active.contains(label))
                .unwrap_or(false)
        })
        .max()
        .unwrap_or(PlanTier::None);

    ReconciliationResult::for_tier(tier)
}

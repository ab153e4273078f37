//! Plan registry.
//!
//! Static lookup from product identifiers and entitlement labels to
//! [`PlanTier`]. Lookups never fail: anything unrecognized maps to
//! [`PlanTier::None`].

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::PlanTier;

static BY_IDENTIFIER: Lazy<HashMap<&'static str, PlanTier>> = Lazy::new(|| {
    std::iter::once(PlanTier::None)
        .chain(PlanTier::PAID)
        .map(|tier| (tier.identifier(), tier))
        .collect()
});

static BY_ENTITLEMENT: Lazy<HashMap<&'static str, PlanTier>> = Lazy::new(|| {
    PlanTier::PAID
        .into_iter()
        .filter_map(|tier| tier.entitlement_label().map(|label| (label, tier)))
        .collect()
});

/// Looks up a tier by its stable identifier.
pub fn lookup(identifier: &str) -> PlanTier {
    BY_IDENTIFIER
        .get(identifier)
        .copied()
        .unwrap_or(PlanTier::None)
}

/// Looks up a tier by the commerce backend's entitlement label.
pub fn from_entitlement(label: &str) -> PlanTier {
    BY_ENTITLEMENT.get(label).copied().unwrap_or(PlanTier::None)
}

/// Room limit granted by `tier`; 0 for `PlanTier::None`.
pub fn limit_of(tier: PlanTier) -> u32 {
    tier.limit()
}

/// Name shown to users for `tier`.
pub fn display_name_of(tier: PlanTier) -> &'static str {
    tier.display_name()
}

/// Every paid tier in ascending order of limit.
pub fn all() -> &'static [PlanTier] {
    &PlanTier::PAID
}

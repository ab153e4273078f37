//! Plan tier definitions.
//!
//! Represents the room-limit subscription levels sold through the app stores.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subscription plan tier.
///
/// Each paid tier corresponds to one store product and one backend
/// entitlement. The numeric limit is the number of rooms the user may track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// No active subscription.
    None,
    /// One room.
    Tier1,
    /// Two rooms.
    Tier2,
    /// Three rooms.
    Tier3,
    /// Four rooms.
    Tier4,
    /// Five rooms.
    Tier5,
}

impl PlanTier {
    /// Every paid tier, lowest first.
    pub const PAID: [PlanTier; 5] = [
        PlanTier::Tier1,
        PlanTier::Tier2,
        PlanTier::Tier3,
        PlanTier::Tier4,
        PlanTier::Tier5,
    ];

    /// Returns the stable identifier stored on the user profile.
    ///
    /// Paid tiers use the store product identifier.
    pub fn identifier(&self) -> &'static str {
        match self {
            PlanTier::None => "none",
            PlanTier::Tier1 => "com.zthreesolutions.tolerancetracker.room01",
            PlanTier::Tier2 => "com.zthreesolutions.tolerancetracker.room02",
            PlanTier::Tier3 => "com.zthreesolutions.tolerancetracker.room03",
            PlanTier::Tier4 => "com.zthreesolutions.tolerancetracker.room04",
            PlanTier::Tier5 => "com.zthreesolutions.tolerancetracker.room05",
        }
    }

    /// Returns the commerce backend entitlement label granting this tier.
    pub fn entitlement_label(&self) -> Option<&'static str> {
        match self {
            PlanTier::None => None,
            PlanTier::Tier1 => Some("1_entitlement"),
            PlanTier::Tier2 => Some("2_entitlement"),
            PlanTier::Tier3 => Some("3_entitlement"),
            PlanTier::Tier4 => Some("4_entitlement"),
            PlanTier::Tier5 => Some("5_entitlement"),
        }
    }

    /// Returns the number of rooms this tier allows.
    pub fn limit(&self) -> u32 {
        match self {
            PlanTier::None => 0,
            PlanTier::Tier1 => 1,
            PlanTier::Tier2 => 2,
            PlanTier::Tier3 => 3,
            PlanTier::Tier4 => 4,
            PlanTier::Tier5 => 5,
        }
    }

    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlanTier::None => "No Plan",
            PlanTier::Tier1 => "1 Room",
            PlanTier::Tier2 => "2 Rooms",
            PlanTier::Tier3 => "3 Rooms",
            PlanTier::Tier4 => "4 Rooms",
            PlanTier::Tier5 => "5 Rooms",
        }
    }

    /// Returns true if this tier is a paid tier.
    pub fn is_paid(&self) -> bool {
        !matches!(self, PlanTier::None)
    }
}

impl Default for PlanTier {
    fn default() -> Self {
        PlanTier::None
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

//! Subscription domain module.
//!
//! Maps store entitlements to room-limit plans.
//!
//! # Module Structure
//!
//! - `tier` - PlanTier levels and their limits
//! - `registry` - Identifier and entitlement lookups
//! - `resolver` - Entitlement set to single tier
//! - `events` - SubscriptionUpdated notification
//! - `errors` - SubscriptionError taxonomy
//! - `outcome` - PurchaseOutcome returned to callers
//! - `state` - Observable PlanState and offerings LoadState

mod errors;
mod events;
mod outcome;
pub mod registry;
mod resolver;
mod state;
mod tier;

pub use errors::SubscriptionError;
pub use events::{SubscriptionUpdated, SUBSCRIPTION_UPDATED};
pub use outcome::PurchaseOutcome;
pub use resolver::{resolve, ActiveEntitlements, ReconciliationResult};
pub use state::{LoadState, PlanState};
pub use tier::PlanTier;

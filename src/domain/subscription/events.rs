//! Subscription domain events.
//!
//! Published on the notification sink after a plan change has been durably
//! written to the user's profile. Consumers never see a change that was not
//! saved.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, EventId, Timestamp, UserId};

use super::ReconciliationResult;

/// Topic name consumers subscribe to for plan changes.
pub const SUBSCRIPTION_UPDATED: &str = "SubscriptionUpdated";

/// The user's plan and room limit were written to their profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionUpdated {
    pub event_id: EventId,
    pub user_id: UserId,
    /// Plan identifier as stored on the profile.
    pub plan: String,
    /// Room limit as stored on the profile.
    pub limit: u32,
    pub occurred_at: Timestamp,
}

impl SubscriptionUpdated {
    pub fn new(user_id: UserId, result: &ReconciliationResult) -> Self {
        Self {
            event_id: EventId::new(),
            user_id,
            plan: result.plan_identifier().to_string(),
            limit: result.limit,
            occurred_at: Timestamp::now(),
        }
    }
}

domain_event!(
    SubscriptionUpdated,
    event_type = SUBSCRIPTION_UPDATED,
    aggregate_id = user_id,
    occurred_at = occurred_at,
    event_id = event_id
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainEvent, SerializableDomainEvent};
    use crate::domain::subscription::PlanTier;

    #[test]
    fn event_type_matches_topic() {
        let event = SubscriptionUpdated::new(
            UserId::new("u1").unwrap(),
            &ReconciliationResult::for_tier(PlanTier::Tier2),
        );
        assert_eq!(event.event_type(), SUBSCRIPTION_UPDATED);
        assert_eq!(event.aggregate_id(), "u1");
    }

    #[test]
    fn envelope_payload_carries_plan_and_limit() {
        let event = SubscriptionUpdated::new(
            UserId::new("u1").unwrap(),
            &ReconciliationResult::for_tier(PlanTier::Tier4),
        );
        let envelope = event.to_envelope().unwrap();

        assert_eq!(envelope.event_type, "SubscriptionUpdated");
        assert_eq!(
            envelope.payload["plan"],
            "com.zthreesolutions.tolerancetracker.room04"
        );
        assert_eq!(envelope.payload["limit"], 4);

        let decoded: SubscriptionUpdated = envelope.payload_as().unwrap();
        assert_eq!(decoded, event);
    }
}

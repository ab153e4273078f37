//! ProfileStore port for the user-profile document store.
//!
//! Profiles are created by the registration flow elsewhere. This crate only
//! reads them by identity and writes the two plan fields.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ProfileRecordId, UserId};
use crate::domain::subscription::ReconciliationResult;

/// Port for the user-profile store.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Find every profile record keyed by the given identity.
    ///
    /// Callers expect exactly one; the store does not enforce it.
    async fn find_by_identity(&self, user_id: &UserId) -> Result<Vec<ProfileHandle>, DomainError>;

    /// Overwrite the plan fields of one record.
    async fn update_plan_fields(
        &self,
        handle: &ProfileHandle,
        fields: &PlanFields,
    ) -> Result<(), DomainError>;
}

/// Reference to one profile record, valid for a single update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileHandle {
    pub record_id: ProfileRecordId,
    pub user_id: UserId,
}

/// The plan fields written on a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanFields {
    pub subscription_plan: String,
    pub room_limit: u32,
}

impl From<&ReconciliationResult> for PlanFields {
    fn from(result: &ReconciliationResult) -> Self {
        Self {
            subscription_plan: result.plan_identifier().to_string(),
            room_limit: result.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::PlanTier;

    #[test]
    fn profile_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn ProfileStore) {}
    }

    #[test]
    fn plan_fields_use_document_field_names() {
        let fields = PlanFields::from(&ReconciliationResult::for_tier(PlanTier::Tier4));
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(
            json["subscriptionPlan"],
            "com.zthreesolutions.tolerancetracker.room04"
        );
        assert_eq!(json["roomLimit"], 4);
    }

    #[test]
    fn no_plan_writes_none_and_zero() {
        let fields = PlanFields::from(&ReconciliationResult::none());
        assert_eq!(fields.subscription_plan, "none");
        assert_eq!(fields.room_limit, 0);
    }
}

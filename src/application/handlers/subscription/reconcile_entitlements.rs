//! ReconcileEntitlementsHandler - maps an entitlement snapshot onto the
//! user's plan, saves it and announces the change.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::application::PlanStateHolder;
use crate::domain::foundation::{SerializableDomainEvent, UserId};
use crate::domain::subscription::{
    resolve, ActiveEntitlements, ReconciliationResult, SubscriptionError, SubscriptionUpdated,
};
use crate::ports::{EventPublisher, IdentityProvider, PlanFields, ProfileHandle, ProfileStore};

/// Command to reconcile a set of active entitlements.
#[derive(Debug, Clone)]
pub struct ReconcileEntitlementsCommand {
    pub active: ActiveEntitlements,
}

/// What happened to the profile during a reconcile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceStatus {
    /// Plan fields were written.
    Saved,
    /// Nothing was written and nothing went wrong (no identity, no single
    /// matching profile).
    Skipped(SubscriptionError),
    /// The store was reached but the lookup or write failed.
    Failed(SubscriptionError),
}

impl PersistenceStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, PersistenceStatus::Saved)
    }

    pub fn error(&self) -> Option<&SubscriptionError> {
        match self {
            PersistenceStatus::Saved => None,
            PersistenceStatus::Skipped(e) | PersistenceStatus::Failed(e) => Some(e),
        }
    }
}

/// Result of one reconcile pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    pub result: ReconciliationResult,
    pub persistence: PersistenceStatus,
    /// True when `SubscriptionUpdated` reached the notification sink.
    pub notified: bool,
}

/// Handler for entitlement reconciliation.
///
/// Passes run one at a time; a pass that starts while another is writing
/// waits for it, so the last completed pass decides the stored plan.
pub struct ReconcileEntitlementsHandler {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileStore>,
    event_publisher: Arc<dyn EventPublisher>,
    state: Arc<PlanStateHolder>,
    in_flight: Mutex<()>,
}

impl ReconcileEntitlementsHandler {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        event_publisher: Arc<dyn EventPublisher>,
        state: Arc<PlanStateHolder>,
    ) -> Self {
        Self {
            identity,
            profiles,
            event_publisher,
            state,
            in_flight: Mutex::new(()),
        }
    }

    pub async fn handle(&self, cmd: ReconcileEntitlementsCommand) -> ReconcileReport {
        let _pass = self.in_flight.lock().await;

        // 1. Resolve and update in-memory state first; persistence never rolls it back
        let result = resolve(&cmd.active);
        debug!(
            entitlements = cmd.active.len(),
            plan = result.plan_identifier(),
            limit = result.limit,
            "Resolved entitlements"
        );
        self.state.set_plan(result);

        // 2. Without a signed-in user there is no profile to update
        let Some(user_id) = self.identity.current_identity() else {
            info!(plan = result.plan_identifier(), "No signed-in user, plan kept in memory only");
            return ReconcileReport {
                result,
                persistence: PersistenceStatus::Skipped(SubscriptionError::NoAuthenticatedIdentity),
                notified: false,
            };
        };

        // 3-4. Find the one profile and write the plan fields
        let persistence = self.persist(&user_id, &result).await;
        if !persistence.is_saved() {
            return ReconcileReport {
                result,
                persistence,
                notified: false,
            };
        }

        // 5. Announce the saved plan
        let notified = self.announce(user_id, &result).await;

        ReconcileReport {
            result,
            persistence,
            notified,
        }
    }

    async fn persist(&self, user_id: &UserId, result: &ReconciliationResult) -> PersistenceStatus {
        let matches = match self.profiles.find_by_identity(user_id).await {
            Ok(matches) => matches,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Profile lookup failed");
                return PersistenceStatus::Failed(SubscriptionError::read_failed(
                    user_id.clone(),
                    e.to_string(),
                ));
            }
        };

        let [handle] = match <[ProfileHandle; 1]>::try_from(matches) {
            Ok(one) => one,
            Err(other) => {
                warn!(
                    user_id = %user_id,
                    matches = other.len(),
                    "Expected exactly one profile, plan not saved"
                );
                return PersistenceStatus::Skipped(SubscriptionError::not_found(
                    user_id.clone(),
                    other.len(),
                ));
            }
        };

        let fields = PlanFields::from(result);
        match self.profiles.update_plan_fields(&handle, &fields).await {
            Ok(()) => {
                info!(
                    user_id = %user_id,
                    plan = %fields.subscription_plan,
                    limit = fields.room_limit,
                    "Saved plan to profile"
                );
                PersistenceStatus::Saved
            }
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Failed to save plan to profile");
                PersistenceStatus::Failed(SubscriptionError::write_failed(
                    user_id.clone(),
                    e.to_string(),
                ))
            }
        }
    }

    async fn announce(&self, user_id: UserId, result: &ReconciliationResult) -> bool {
        let event = SubscriptionUpdated::new(user_id.clone(), result);
        let envelope = match event.to_envelope() {
            Ok(envelope) => envelope.with_user_id(user_id.as_str()),
            Err(e) => {
                error!(error = %e, "Failed to serialize SubscriptionUpdated");
                return false;
            }
        };

        match self.event_publisher.publish(envelope).await {
            Ok(()) => true,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to publish SubscriptionUpdated");
                false
            }
        }
    }
}

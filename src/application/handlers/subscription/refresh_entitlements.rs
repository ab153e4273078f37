//! RefreshEntitlementsHandler - re-reads entitlements and reconciles them.
//!
//! Runs at startup and whenever the host wants the stored plan brought back
//! in line with the store, e.g. when the app returns to the foreground.

use std::sync::Arc;

use tracing::{debug, error};

use crate::application::PlanStateHolder;
use crate::domain::subscription::SubscriptionError;
use crate::ports::CommerceBackend;

use super::{ReconcileEntitlementsCommand, ReconcileEntitlementsHandler, ReconcileReport};

pub struct RefreshEntitlementsHandler {
    commerce: Arc<dyn CommerceBackend>,
    reconciler: Arc<ReconcileEntitlementsHandler>,
    state: Arc<PlanStateHolder>,
}

impl RefreshEntitlementsHandler {
    pub fn new(
        commerce: Arc<dyn CommerceBackend>,
        reconciler: Arc<ReconcileEntitlementsHandler>,
        state: Arc<PlanStateHolder>,
    ) -> Self {
        Self {
            commerce,
            reconciler,
            state,
        }
    }

    /// Fetch current entitlements and reconcile them.
    ///
    /// A backend error is returned without touching the current plan.
    pub async fn handle(&self) -> Result<ReconcileReport, SubscriptionError> {
        let _loading = self.state.begin_loading();

        let snapshot = self
            .commerce
            .fetch_current_entitlements()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to fetch current entitlements");
                SubscriptionError::from(e)
            })?;

        debug!(
            entitlements = snapshot.active.len(),
            app_user_id = snapshot.app_user_id.as_deref(),
            "Fetched current entitlements"
        );

        Ok(self
            .reconciler
            .handle(ReconcileEntitlementsCommand {
                active: snapshot.active,
            })
            .await)
    }
}

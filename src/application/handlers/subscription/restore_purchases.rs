//! RestorePurchasesHandler - Command handler for restoring prior purchases.

use std::sync::Arc;

use tracing::{error, info};

use crate::application::PlanStateHolder;
use crate::domain::subscription::{PurchaseOutcome, SubscriptionError};
use crate::ports::CommerceBackend;

use super::{ReconcileEntitlementsCommand, ReconcileEntitlementsHandler};

/// Handler for restoring purchases made with the current store account.
///
/// Restoring with nothing to restore succeeds and downgrades the user to no
/// plan.
pub struct RestorePurchasesHandler {
    commerce: Arc<dyn CommerceBackend>,
    reconciler: Arc<ReconcileEntitlementsHandler>,
    state: Arc<PlanStateHolder>,
}

impl RestorePurchasesHandler {
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

    pub async fn handle(&self) -> PurchaseOutcome {
        let _loading = self.state.begin_loading();

        match self.commerce.restore().await {
            Ok(snapshot) => {
                info!(entitlements = snapshot.active.len(), "Purchases restored");
                self.state.clear_error();
                let report = self
                    .reconciler
                    .handle(ReconcileEntitlementsCommand {
                        active: snapshot.active,
                    })
                    .await;
                PurchaseOutcome::succeeded(report.result)
            }
            Err(e) => {
                error!(error = %e, "Restore failed");
                let err = SubscriptionError::from(e);
                self.state.record_error(err.to_string());
                PurchaseOutcome::from(err)
            }
        }
    }
}

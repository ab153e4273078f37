//! PurchasePackageHandler - Command handler for buying a plan package.

use std::sync::Arc;

use tracing::{error, info};

use crate::application::PlanStateHolder;
use crate::domain::subscription::{PurchaseOutcome, SubscriptionError};
use crate::ports::{CommerceBackend, Package, PurchaseResult};

use super::{ReconcileEntitlementsCommand, ReconcileEntitlementsHandler};

/// Command to purchase one package from the current offerings.
#[derive(Debug, Clone)]
pub struct PurchasePackageCommand {
    pub package: Package,
}

/// Handler for package purchases.
///
/// A completed purchase is reconciled with the entitlements the store
/// returned. Cancellation and backend failures leave the stored plan alone.
pub struct PurchasePackageHandler {
    commerce: Arc<dyn CommerceBackend>,
    reconciler: Arc<ReconcileEntitlementsHandler>,
    state: Arc<PlanStateHolder>,
}

impl PurchasePackageHandler {
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

    pub async fn handle(&self, cmd: PurchasePackageCommand) -> PurchaseOutcome {
        let _loading = self.state.begin_loading();
        let product = cmd.package.product_identifier.as_str();

        match self.commerce.purchase(&cmd.package).await {
            Ok(PurchaseResult::Completed(snapshot)) => {
                info!(product, "Purchase completed");
                self.state.clear_error();
                let report = self
                    .reconciler
                    .handle(ReconcileEntitlementsCommand {
                        active: snapshot.active,
                    })
                    .await;
                PurchaseOutcome::succeeded(report.result)
            }
            Ok(PurchaseResult::Cancelled) => {
                info!(product, "Purchase cancelled by user");
                PurchaseOutcome::cancelled()
            }
            Err(e) => {
                error!(product, error = %e, "Purchase failed");
                let err = SubscriptionError::from(e);
                self.state.record_error(err.to_string());
                PurchaseOutcome::from(err)
            }
        }
    }
}

//! SubscriptionCoordinator - the entry point the host app talks to.
//!
//! Wires the subscription handlers to one set of ports and one plan state.
//! Every operation reports through return values and the plan state; none
//! of them fail the caller.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::domain::subscription::{
    ActiveEntitlements, PlanState, PurchaseOutcome, ReconciliationResult, SubscriptionError,
};
use crate::ports::{
    CommerceBackend, EventPublisher, IdentityProvider, Offering, Offerings, Package, ProfileStore,
    SystemLauncher,
};

use super::handlers::{
    LoadOfferingsHandler, PurchasePackageCommand, PurchasePackageHandler,
    ReconcileEntitlementsCommand, ReconcileEntitlementsHandler, ReconcileReport,
    RefreshEntitlementsHandler, RestorePurchasesHandler,
};
use super::PlanStateHolder;

/// External collaborators the coordinator needs.
#[derive(Clone)]
pub struct CoordinatorPorts {
    pub commerce: Arc<dyn CommerceBackend>,
    pub profiles: Arc<dyn ProfileStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub events: Arc<dyn EventPublisher>,
    pub launcher: Arc<dyn SystemLauncher>,
}

/// Behavior knobs, usually built from `CommerceConfig`.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorSettings {
    /// Used when the backend has no management URL for the user.
    pub fallback_management_url: Option<String>,
    /// Offering to display when the dashboard marks none as current.
    pub offering_id: Option<String>,
}

pub struct SubscriptionCoordinator {
    commerce: Arc<dyn CommerceBackend>,
    launcher: Arc<dyn SystemLauncher>,
    state: Arc<PlanStateHolder>,
    settings: CoordinatorSettings,
    reconcile_handler: Arc<ReconcileEntitlementsHandler>,
    purchase_handler: PurchasePackageHandler,
    restore_handler: RestorePurchasesHandler,
    refresh_handler: RefreshEntitlementsHandler,
    offerings_handler: LoadOfferingsHandler,
}

/// Background work started by [`SubscriptionCoordinator::initialize`].
pub struct InitializeHandle {
    offerings: JoinHandle<Option<Offerings>>,
    entitlements: JoinHandle<Result<ReconcileReport, SubscriptionError>>,
}

/// What the startup fetches produced.
#[derive(Debug)]
pub struct InitializeSummary {
    pub offerings: Option<Offerings>,
    pub entitlements: Result<ReconcileReport, SubscriptionError>,
}

impl InitializeHandle {
    /// Wait for both startup fetches to finish.
    pub async fn wait(self) -> InitializeSummary {
        let (offerings, entitlements) = tokio::join!(self.offerings, self.entitlements);

        let offerings = offerings.unwrap_or_else(|e| {
            warn!(error = %e, "Offerings task did not complete");
            None
        });
        let entitlements = entitlements.unwrap_or_else(|e| {
            warn!(error = %e, "Entitlement task did not complete");
            Err(SubscriptionError::backend("Entitlement refresh was interrupted"))
        });

        InitializeSummary {
            offerings,
            entitlements,
        }
    }
}

impl SubscriptionCoordinator {
    pub fn new(ports: CoordinatorPorts, settings: CoordinatorSettings) -> Arc<Self> {
        let state = Arc::new(PlanStateHolder::new());
        let reconcile = Arc::new(ReconcileEntitlementsHandler::new(
            ports.identity,
            ports.profiles,
            ports.events,
            Arc::clone(&state),
        ));

        Arc::new(Self {
            purchase_handler: PurchasePackageHandler::new(
                Arc::clone(&ports.commerce),
                Arc::clone(&reconcile),
                Arc::clone(&state),
            ),
            restore_handler: RestorePurchasesHandler::new(
                Arc::clone(&ports.commerce),
                Arc::clone(&reconcile),
                Arc::clone(&state),
            ),
            refresh_handler: RefreshEntitlementsHandler::new(
                Arc::clone(&ports.commerce),
                Arc::clone(&reconcile),
                Arc::clone(&state),
            ),
            offerings_handler: LoadOfferingsHandler::new(
                Arc::clone(&ports.commerce),
                Arc::clone(&state),
                settings.offering_id.clone(),
            ),
            commerce: ports.commerce,
            launcher: ports.launcher,
            state,
            settings,
            reconcile_handler: reconcile,
        })
    }

    /// Build a coordinator and kick off its startup fetches.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(
        ports: CoordinatorPorts,
        settings: CoordinatorSettings,
    ) -> (Arc<Self>, InitializeHandle) {
        let coordinator = Self::new(ports, settings);
        let handle = coordinator.initialize();
        (coordinator, handle)
    }

    /// Fetch offerings and current entitlements in the background.
    ///
    /// Returns immediately; the plan state reflects progress.
    pub fn initialize(self: &Arc<Self>) -> InitializeHandle {
        info!("Initializing subscriptions");

        let offerings = {
            let this = Arc::clone(self);
            tokio::spawn(async move { this.load_offerings().await })
        };
        let entitlements = {
            let this = Arc::clone(self);
            tokio::spawn(async move { this.refresh().await })
        };

        InitializeHandle {
            offerings,
            entitlements,
        }
    }

    #[instrument(skip(self, package), fields(product = %package.product_identifier))]
    pub async fn purchase(&self, package: Package) -> PurchaseOutcome {
        self.purchase_handler.handle(PurchasePackageCommand { package }).await
    }

    #[instrument(skip(self))]
    pub async fn restore(&self) -> PurchaseOutcome {
        self.restore_handler.handle().await
    }

    /// Bring the plan back in line with the store's current entitlements.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<ReconcileReport, SubscriptionError> {
        self.refresh_handler.handle().await
    }

    #[instrument(skip(self))]
    pub async fn load_offerings(&self) -> Option<Offerings> {
        self.offerings_handler.handle().await
    }

    /// Reconcile entitlements obtained elsewhere, e.g. from a backend push.
    #[instrument(skip(self, active), fields(entitlements = active.len()))]
    pub async fn reconcile(&self, active: ActiveEntitlements) -> ReconcileReport {
        self.reconcile_handler
            .handle(ReconcileEntitlementsCommand { active })
            .await
    }

    /// Open the platform's subscription management page.
    ///
    /// Returns whether a URL was handed to the launcher. Failures are logged.
    #[instrument(skip(self))]
    pub fn open_subscription_management(&self) -> bool {
        let Some(url) = self
            .commerce
            .management_url()
            .or_else(|| self.settings.fallback_management_url.clone())
        else {
            warn!("No subscription management URL available");
            return false;
        };

        match self.launcher.open(&url) {
            Ok(()) => true,
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to open subscription management");
                false
            }
        }
    }

    /// Offerings from the last successful fetch.
    pub fn offerings(&self) -> Option<Offerings> {
        self.offerings_handler.cached()
    }

    /// The offering the paywall should display.
    pub fn display_offering(&self) -> Option<Offering> {
        self.offerings_handler.display_offering()
    }

    pub fn state(&self) -> &Arc<PlanStateHolder> {
        &self.state
    }

    pub fn snapshot(&self) -> PlanState {
        self.state.snapshot()
    }

    pub fn current_plan(&self) -> ReconciliationResult {
        self.state.current_plan()
    }
}

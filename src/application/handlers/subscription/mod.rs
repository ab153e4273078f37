//! Subscription handlers.
//!
//! ## Commands
//! - Reconciling an entitlement snapshot onto the user's plan
//! - Purchasing a package
//! - Restoring purchases
//! - Refreshing current entitlements
//!
//! ## Queries
//! - Loading offerings for the paywall

mod load_offerings;
mod purchase_package;
mod reconcile_entitlements;
mod refresh_entitlements;
mod restore_purchases;

// Commands
pub use purchase_package::{PurchasePackageCommand, PurchasePackageHandler};
pub use reconcile_entitlements::{
    PersistenceStatus, ReconcileEntitlementsCommand, ReconcileEntitlementsHandler, ReconcileReport,
};
pub use refresh_entitlements::RefreshEntitlementsHandler;
pub use restore_purchases::RestorePurchasesHandler;

// Queries
pub use load_offerings::LoadOfferingsHandler;

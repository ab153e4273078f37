//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod subscription;

pub use subscription::{
    LoadOfferingsHandler, PersistenceStatus, PurchasePackageCommand, PurchasePackageHandler,
    ReconcileEntitlementsCommand, ReconcileEntitlementsHandler, ReconcileReport,
    RefreshEntitlementsHandler, RestorePurchasesHandler,
};

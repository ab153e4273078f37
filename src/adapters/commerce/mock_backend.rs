//! Mock commerce backend for testing and local runs.
//!
//! Behaves like a store account: purchasing a package grants the
//! entitlement of the plan its product maps to, and restore or fetch
//! return whatever the account currently holds. Supports:
//! - Pre-configured offerings and entitlements
//! - Cancelled purchases
//! - Error injection
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::subscription::{registry, ActiveEntitlements};
use crate::ports::{
    CommerceBackend, CommerceError, CommerceErrorCode, EntitlementSnapshot, Offerings, Package,
    PurchaseResult,
};

/// Mock commerce backend.
///
/// # Example
///
/// ```ignore
/// let backend = MockCommerceBackend::new();
/// backend.set_offerings(offerings);
/// backend.cancel_next_purchase();
///
/// let result = backend.purchase(&package).await?;
/// assert_eq!(result, PurchaseResult::Cancelled);
/// ```
#[derive(Default)]
pub struct MockCommerceBackend {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Offerings returned by `fetch_offerings`.
    offerings: Offerings,

    /// Entitlements the store account currently holds.
    entitlements: ActiveEntitlements,

    /// Backend app-user id attached to snapshots.
    app_user_id: Option<String>,

    /// URL returned by `management_url`.
    management_url: Option<String>,

    /// Cancel the next purchase instead of completing it.
    cancel_next: bool,

    /// Error to return on next call.
    next_error: Option<CommerceError>,

    /// Specific errors by method name.
    method_errors: HashMap<String, CommerceError>,

    /// Track method calls for assertions.
    call_log: Vec<MethodCall>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockCommerceBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend whose account already holds the given entitlements.
    pub fn with_entitlements<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backend = Self::new();
        backend.lock().entitlements = labels.into_iter().collect();
        backend
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    pub fn set_offerings(&self, offerings: Offerings) {
        self.lock().offerings = offerings;
    }

    /// Add an entitlement to the account, as a purchase on another device would.
    pub fn grant(&self, label: impl Into<String>) {
        self.lock().entitlements.insert(label);
    }

    /// Replace the account's entitlements, e.g. to simulate an expiry.
    pub fn set_entitlements<I, S>(&self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().entitlements = labels.into_iter().collect();
    }

    pub fn set_app_user_id(&self, id: impl Into<String>) {
        self.lock().app_user_id = Some(id.into());
    }

    pub fn set_management_url(&self, url: impl Into<String>) {
        self.lock().management_url = Some(url.into());
    }

    /// Make the next `purchase` report that the user dismissed the sheet.
    pub fn cancel_next_purchase(&self) {
        self.lock().cancel_next = true;
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: CommerceError) {
        self.lock().next_error = Some(error);
    }

    /// Set an error for a specific method until cleared.
    pub fn set_method_error(&self, method: &str, error: CommerceError) {
        self.lock().method_errors.insert(method.to_string(), error);
    }

    pub fn clear_errors(&self) {
        let mut state = self.lock();
        state.next_error = None;
        state.method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.lock().call_log.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.lock().call_log.iter().any(|c| c.method == method)
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.lock()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.lock().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), CommerceError> {
        let mut state = self.lock();

        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }

    fn snapshot(state: &MockState) -> EntitlementSnapshot {
        let snapshot = EntitlementSnapshot::new(state.entitlements.clone());
        match &state.app_user_id {
            Some(id) => snapshot.with_app_user_id(id.as_str()),
            None => snapshot,
        }
    }
}

impl Clone for MockCommerceBackend {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl CommerceBackend for MockCommerceBackend {
    async fn fetch_offerings(&self) -> Result<Offerings, CommerceError> {
        self.record_call("fetch_offerings", vec![]);
        self.check_error("fetch_offerings")?;
        Ok(self.lock().offerings.clone())
    }

    async fn purchase(&self, package: &Package) -> Result<PurchaseResult, CommerceError> {
        self.record_call("purchase", vec![package.product_identifier.clone()]);
        self.check_error("purchase")?;

        let mut state = self.lock();
        if std::mem::take(&mut state.cancel_next) {
            return Ok(PurchaseResult::Cancelled);
        }

        let label = registry::lookup(&package.product_identifier)
            .entitlement_label()
            .ok_or_else(|| {
                CommerceError::new(
                    CommerceErrorCode::ProductUnavailable,
                    format!("Unknown product {}", package.product_identifier),
                )
            })?;
        state.entitlements.insert(label);

        Ok(PurchaseResult::Completed(Self::snapshot(&state)))
    }

    async fn restore(&self) -> Result<EntitlementSnapshot, CommerceError> {
        self.record_call("restore", vec![]);
        self.check_error("restore")?;
        Ok(Self::snapshot(&self.lock()))
    }

    async fn fetch_current_entitlements(&self) -> Result<EntitlementSnapshot, CommerceError> {
        self.record_call("fetch_current_entitlements", vec![]);
        self.check_error("fetch_current_entitlements")?;
        Ok(Self::snapshot(&self.lock()))
    }

    fn management_url(&self) -> Option<String> {
        self.lock().management_url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::subscription::PlanTier;

    fn package(tier: PlanTier) -> Package {
        Package {
            identifier: format!("$rc_{}", tier.limit()),
            product_identifier: tier.identifier().to_string(),
            localized_price: "$1.99".to_string(),
        }
    }

    #[tokio::test]
    async fn purchase_grants_entitlement_for_product() {
        let backend = MockCommerceBackend::new();

        let result = backend.purchase(&package(PlanTier::Tier2)).await.unwrap();

        match result {
            PurchaseResult::Completed(snapshot) => {
                assert!(snapshot.active.contains("2_entitlement"));
            }
            PurchaseResult::Cancelled => panic!("expected completed purchase"),
        }
        assert!(backend
            .fetch_current_entitlements()
            .await
            .unwrap()
            .active
            .contains("2_entitlement"));
    }

    #[tokio::test]
    async fn cancel_applies_to_one_purchase() {
        let backend = MockCommerceBackend::new();
        backend.cancel_next_purchase();

        let first = backend.purchase(&package(PlanTier::Tier1)).await.unwrap();
        let second = backend.purchase(&package(PlanTier::Tier1)).await.unwrap();

        assert_eq!(first, PurchaseResult::Cancelled);
        assert!(matches!(second, PurchaseResult::Completed(_)));
    }

    #[tokio::test]
    async fn unknown_product_is_unavailable() {
        let backend = MockCommerceBackend::new();
        let mut bogus = package(PlanTier::Tier1);
        bogus.product_identifier = "com.example.other".to_string();

        let err = backend.purchase(&bogus).await.unwrap_err();

        assert_eq!(err.code, CommerceErrorCode::ProductUnavailable);
    }

    #[tokio::test]
    async fn next_error_is_consumed() {
        let backend = MockCommerceBackend::with_entitlements(["1_entitlement"]);
        backend.set_error(CommerceError::network("offline"));

        assert!(backend.restore().await.is_err());
        assert_eq!(backend.restore().await.unwrap().active.len(), 1);
    }

    #[tokio::test]
    async fn method_error_persists_until_cleared() {
        let backend = MockCommerceBackend::new();
        backend.set_method_error("fetch_offerings", CommerceError::store("down"));

        assert!(backend.fetch_offerings().await.is_err());
        assert!(backend.fetch_offerings().await.is_err());
        backend.clear_errors();
        assert!(backend.fetch_offerings().await.is_ok());
        assert_eq!(backend.call_count("fetch_offerings"), 3);
    }

    #[tokio::test]
    async fn snapshots_carry_app_user_id() {
        let backend = MockCommerceBackend::new();
        backend.set_app_user_id("$RCAnonymousID:abc");

        let snapshot = backend.restore().await.unwrap();

        assert_eq!(snapshot.app_user_id.as_deref(), Some("$RCAnonymousID:abc"));
        assert!(backend.was_called("restore"));
    }
}

//! Commerce backend port for the in-app purchase SDK.
//!
//! The backend is the service of record for purchases and entitlements.
//! Receipt validation, payment processing and cross-device sync all happen
//! behind this trait; the crate only consumes the resulting entitlement set.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::domain::subscription::{ActiveEntitlements, SubscriptionError};

/// Port for the commerce SDK.
#[async_trait]
pub trait CommerceBackend: Send + Sync {
    /// Fetch the offerings configured for display.
    async fn fetch_offerings(&self) -> Result<Offerings, CommerceError>;

    /// Start a purchase of the given package.
    ///
    /// A user dismissing the store sheet is `Ok(PurchaseResult::Cancelled)`,
    /// not an error.
    async fn purchase(&self, package: &Package) -> Result<PurchaseResult, CommerceError>;

    /// Restore previously made purchases for the current store account.
    async fn restore(&self) -> Result<EntitlementSnapshot, CommerceError>;

    /// Fetch the entitlements currently active for the configured identity.
    async fn fetch_current_entitlements(&self) -> Result<EntitlementSnapshot, CommerceError>;

    /// URL of the platform's subscription management page, if the backend
    /// knows one for the current user.
    fn management_url(&self) -> Option<String>;
}

/// A set of offerings as configured in the commerce dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offerings {
    /// Identifier of the offering marked current, if any.
    pub current: Option<String>,
    pub all: Vec<Offering>,
}

impl Offerings {
    /// Returns the current offering.
    pub fn current_offering(&self) -> Option<&Offering> {
        let current = self.current.as_deref()?;
        self.all.iter().find(|o| o.identifier == current)
    }

    /// Finds an offering by identifier.
    pub fn offering(&self, identifier: &str) -> Option<&Offering> {
        self.all.iter().find(|o| o.identifier == identifier)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offering {
    pub identifier: String,
    pub packages: Vec<Package>,
}

/// A purchasable package wrapping one store product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub identifier: String,
    /// Store product identifier (matches a plan identifier).
    pub product_identifier: String,
    /// Price formatted for the user's locale.
    pub localized_price: String,
}

/// Entitlements reported by the backend at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementSnapshot {
    pub active: ActiveEntitlements,
    /// The backend's id for the purchasing user, when known.
    pub app_user_id: Option<String>,
    pub fetched_at: Timestamp,
}

impl EntitlementSnapshot {
    pub fn new(active: ActiveEntitlements) -> Self {
        Self {
            active,
            app_user_id: None,
            fetched_at: Timestamp::now(),
        }
    }

    pub fn with_app_user_id(mut self, id: impl Into<String>) -> Self {
        self.app_user_id = Some(id.into());
        self
    }
}

/// What a purchase attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseResult {
    Completed(EntitlementSnapshot),
    Cancelled,
}

/// Errors from commerce backend operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommerceError {
    pub code: CommerceErrorCode,

    /// Human-readable message, safe to show to the user.
    pub message: String,

    /// SDK-specific error code, if available.
    pub backend_code: Option<String>,

    pub retryable: bool,
}

impl CommerceError {
    pub fn new(code: CommerceErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            backend_code: None,
            retryable: code.is_retryable(),
        }
    }

    pub fn with_backend_code(mut self, code: impl Into<String>) -> Self {
        self.backend_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(CommerceErrorCode::NetworkError, message)
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::new(CommerceErrorCode::StoreProblem, message)
    }

    pub fn not_allowed(message: impl Into<String>) -> Self {
        Self::new(CommerceErrorCode::PurchaseNotAllowed, message)
    }
}

impl std::fmt::Display for CommerceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CommerceError {}

impl From<CommerceError> for SubscriptionError {
    fn from(err: CommerceError) -> Self {
        SubscriptionError::BackendUnavailable {
            message: err.message,
            retryable: err.retryable,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommerceErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// The app store reported a problem.
    StoreProblem,

    /// Purchases are disabled on this device or account.
    PurchaseNotAllowed,

    /// The product is not available for purchase.
    ProductUnavailable,

    /// SDK misconfiguration (bad key, missing offering).
    Configuration,

    Unknown,
}

impl CommerceErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CommerceErrorCode::NetworkError | CommerceErrorCode::StoreProblem
        )
    }
}

impl std::fmt::Display for CommerceErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CommerceErrorCode::NetworkError => "network_error",
            CommerceErrorCode::StoreProblem => "store_problem",
            CommerceErrorCode::PurchaseNotAllowed => "purchase_not_allowed",
            CommerceErrorCode::ProductUnavailable => "product_unavailable",
            CommerceErrorCode::Configuration => "configuration",
            CommerceErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commerce_backend_is_object_safe() {
        fn _accepts_dyn(_backend: &dyn CommerceBackend) {}
    }

    #[test]
    fn error_retryability_follows_code() {
        assert!(CommerceError::network("offline").retryable);
        assert!(CommerceError::store("store down").retryable);
        assert!(!CommerceError::not_allowed("parental controls").retryable);
    }

    #[test]
    fn error_display_includes_code() {
        let err = CommerceError::network("offline").with_backend_code("10");
        assert_eq!(err.to_string(), "network_error: offline");
        assert_eq!(err.backend_code.as_deref(), Some("10"));
    }

    #[test]
    fn converts_to_backend_unavailable() {
        let err: SubscriptionError = CommerceError::network("offline").into();
        assert_eq!(
            err,
            SubscriptionError::BackendUnavailable {
                message: "offline".to_string(),
                retryable: true
            }
        );
    }

    #[test]
    fn current_offering_is_found_by_identifier() {
        let package = Package {
            identifier: "$rc_monthly".to_string(),
            product_identifier: "com.zthreesolutions.tolerancetracker.room01".to_string(),
            localized_price: "$0.99".to_string(),
        };
        let offerings = Offerings {
            current: Some("default".to_string()),
            all: vec![
                Offering {
                    identifier: "promo".to_string(),
                    packages: vec![],
                },
                Offering {
                    identifier: "default".to_string(),
                    packages: vec![package.clone()],
                },
            ],
        };

        let current = offerings.current_offering().unwrap();
        assert_eq!(current.packages, vec![package]);
        assert!(offerings.offering("promo").is_some());
        assert!(offerings.offering("missing").is_none());
    }

    #[test]
    fn no_current_offering_when_unset() {
        let offerings = Offerings::default();
        assert!(offerings.current_offering().is_none());
    }
}

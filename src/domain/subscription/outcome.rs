//! Caller-visible results of purchase and restore flows.

use serde::{Deserialize, Serialize};

use super::{ReconciliationResult, SubscriptionError};

/// Result of a purchase or restore, as shown to the user.
///
/// Cancellation is reported with `success: false` but is not a failure;
/// check [`PurchaseOutcome::is_cancelled`] to tell the two apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOutcome {
    pub success: bool,
    pub message: Option<String>,
    /// Plan the user ended up on, when the backend returned entitlements.
    pub result: Option<ReconciliationResult>,
    #[serde(default)]
    cancelled: bool,
}

impl PurchaseOutcome {
    pub fn succeeded(result: ReconciliationResult) -> Self {
        Self {
            success: true,
            message: None,
            result: Some(result),
            cancelled: false,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            success: false,
            message: Some(SubscriptionError::UserCancelled.to_string()),
            result: None,
            cancelled: true,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            result: None,
            cancelled: false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl From<SubscriptionError> for PurchaseOutcome {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::UserCancelled => PurchaseOutcome::cancelled(),
            other => PurchaseOutcome::failed(other.to_string()),
        }
    }
}

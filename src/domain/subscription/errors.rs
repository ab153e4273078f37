//! Subscription-specific error types.
//!
//! None of these leave the coordinator as failures: they are logged and
//! folded into a [`PurchaseOutcome`](super::PurchaseOutcome) or a
//! reconcile report.
//!
//! | Error | Treatment |
//! |-------|-----------|
//! | BackendUnavailable | failure outcome with message |
//! | UserCancelled | normal outcome, not a failure |
//! | PersistenceNotFound | soft no-op, in-memory plan still updated |
//! | PersistenceReadFailed | logged, notification withheld |
//! | PersistenceWriteFailed | logged, notification withheld |
//! | NoAuthenticatedIdentity | soft no-op, in-memory plan still updated |

use thiserror::Error;

use crate::domain::foundation::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    /// The commerce backend failed or could not be reached.
    #[error("{message}")]
    BackendUnavailable { message: String, retryable: bool },

    /// The user dismissed the store purchase sheet.
    #[error("Purchase cancelled")]
    UserCancelled,

    /// Zero or several profile records matched the identity.
    #[error("expected exactly one profile for {user_id}, found {matches}")]
    PersistenceNotFound { user_id: UserId, matches: usize },

    /// The profile store could not be queried.
    #[error("failed to look up profile for {user_id}: {reason}")]
    PersistenceReadFailed { user_id: UserId, reason: String },

    /// The profile store rejected the plan update.
    #[error("failed to save plan for {user_id}: {reason}")]
    PersistenceWriteFailed { user_id: UserId, reason: String },

    /// Nobody is signed in, so there is no profile to update.
    #[error("no authenticated identity")]
    NoAuthenticatedIdentity,
}

impl SubscriptionError {
    pub fn backend(message: impl Into<String>) -> Self {
        SubscriptionError::BackendUnavailable {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn not_found(user_id: UserId, matches: usize) -> Self {
        SubscriptionError::PersistenceNotFound { user_id, matches }
    }

    pub fn read_failed(user_id: UserId, reason: impl Into<String>) -> Self {
        SubscriptionError::PersistenceReadFailed {
            user_id,
            reason: reason.into(),
        }
    }

    pub fn write_failed(user_id: UserId, reason: impl Into<String>) -> Self {
        SubscriptionError::PersistenceWriteFailed {
            user_id,
            reason: reason.into(),
        }
    }

    /// Returns true for conditions that leave the in-memory plan updated and
    /// are not reported as failures.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            SubscriptionError::NoAuthenticatedIdentity
                | SubscriptionError::PersistenceNotFound { .. }
                | SubscriptionError::UserCancelled
        )
    }

    /// Returns true if retrying the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SubscriptionError::BackendUnavailable { retryable, .. } => *retryable,
            SubscriptionError::PersistenceReadFailed { .. }
            | SubscriptionError::PersistenceWriteFailed { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("u1").unwrap()
    }

    #[test]
    fn cancelled_message_is_user_facing() {
        assert_eq!(SubscriptionError::UserCancelled.to_string(), "Purchase cancelled");
    }

    #[test]
    fn backend_message_passes_through() {
        let err = SubscriptionError::backend("The store is not available");
        assert_eq!(err.to_string(), "The store is not available");
        assert!(!err.is_soft());
    }

    #[test]
    fn soft_errors_are_classified() {
        assert!(SubscriptionError::NoAuthenticatedIdentity.is_soft());
        assert!(SubscriptionError::not_found(user(), 0).is_soft());
        assert!(!SubscriptionError::write_failed(user(), "timeout").is_soft());
    }

    #[test]
    fn not_found_reports_match_count() {
        let err = SubscriptionError::not_found(user(), 2);
        assert_eq!(err.to_string(), "expected exactly one profile for u1, found 2");
    }

    #[test]
    fn write_failures_are_retryable() {
        assert!(SubscriptionError::write_failed(user(), "timeout").is_retryable());
        assert!(!SubscriptionError::UserCancelled.is_retryable());
    }
}

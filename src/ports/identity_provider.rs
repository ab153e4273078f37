//! IdentityProvider port - who is signed in right now.

use crate::domain::foundation::UserId;

/// Port for the authentication layer.
///
/// Returning `None` means nobody is signed in; reconciliation still updates
/// the in-memory plan but skips persistence.
pub trait IdentityProvider: Send + Sync {
    fn current_identity(&self) -> Option<UserId>;
}

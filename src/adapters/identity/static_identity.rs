//! In-process identity holder.
//!
//! The host app's auth flow calls `sign_in`/`sign_out`; the coordinator only
//! ever reads the current value.

use std::sync::{PoisonError, RwLock};

use crate::domain::foundation::UserId;
use crate::ports::IdentityProvider;

#[derive(Debug, Default)]
pub struct StaticIdentityProvider {
    current: RwLock<Option<UserId>>,
}

impl StaticIdentityProvider {
    /// Provider with nobody signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: UserId) -> Self {
        Self {
            current: RwLock::new(Some(user_id)),
        }
    }

    pub fn sign_in(&self, user_id: UserId) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(user_id);
    }

    pub fn sign_out(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn current_identity(&self) -> Option<UserId> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

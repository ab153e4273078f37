//! SystemLauncher port - opens external pages outside the app.
//!
//! Used for the store's subscription management page. Fire-and-forget: the
//! caller does not wait for the user to come back.

use crate::domain::foundation::DomainError;

pub trait SystemLauncher: Send + Sync {
    /// Hand the URL to the platform. Returns once the request is dispatched.
    fn open(&self, url: &str) -> Result<(), DomainError>;
}

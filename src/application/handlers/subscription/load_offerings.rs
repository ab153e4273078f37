//! LoadOfferingsHandler - fetches the plans on sale for the paywall.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{error, info};

use crate::application::PlanStateHolder;
use crate::domain::subscription::{LoadState, SubscriptionError};
use crate::ports::{CommerceBackend, Offering, Offerings};

/// Handler for offering fetches.
///
/// Drives `PlanState::offerings` through `Idle → Loading → {Idle, Failed}`
/// and keeps the last successful fetch so the paywall can render while a
/// retry is in flight.
pub struct LoadOfferingsHandler {
    commerce: Arc<dyn CommerceBackend>,
    state: Arc<PlanStateHolder>,
    /// Offering to show when the dashboard marks none as current.
    preferred_offering: Option<String>,
    cached: RwLock<Option<Offerings>>,
}

impl LoadOfferingsHandler {
    pub fn new(
        commerce: Arc<dyn CommerceBackend>,
        state: Arc<PlanStateHolder>,
        preferred_offering: Option<String>,
    ) -> Self {
        Self {
            commerce,
            state,
            preferred_offering,
            cached: RwLock::new(None),
        }
    }

    pub async fn handle(&self) -> Option<Offerings> {
        self.state.set_offerings(LoadState::Loading);

        match self.commerce.fetch_offerings().await {
            Ok(offerings) => {
                info!(
                    current = offerings.current.as_deref(),
                    count = offerings.all.len(),
                    "Loaded offerings"
                );
                *self.cached.write().unwrap_or_else(PoisonError::into_inner) =
                    Some(offerings.clone());
                self.state.set_offerings(LoadState::Idle);
                Some(offerings)
            }
            Err(e) => {
                error!(error = %e, "Failed to load offerings");
                self.state
                    .record_error(SubscriptionError::from(e).to_string());
                self.state.set_offerings(LoadState::Failed);
                None
            }
        }
    }

    /// Last successfully fetched offerings.
    pub fn cached(&self) -> Option<Offerings> {
        self.cached
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The offering the paywall should display from the last fetch.
    pub fn display_offering(&self) -> Option<Offering> {
        let cached = self.cached()?;
        cached
            .current_offering()
            .or_else(|| {
                self.preferred_offering
                    .as_deref()
                    .and_then(|id| cached.offering(id))
            })
            .cloned()
    }
}

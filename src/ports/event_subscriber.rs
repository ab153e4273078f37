//! EventSubscriber port - Interface for subscribing to plan notifications.
//!
//! Consumers (room list, paywall, analytics) register handlers for a topic
//! such as `SubscriptionUpdated` and are invoked whenever one is published.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for processing published events.
///
/// Implementations should be:
/// - **Idempotent** - Safe to call multiple times with same event
/// - **Quick** - Long operations should be spawned elsewhere
/// - **Isolated** - Errors don't affect other handlers
///
/// # Example
///
/// ```ignore
/// struct RoomLimitBanner { /* ... */ }
///
/// #[async_trait]
/// impl EventHandler for RoomLimitBanner {
///     async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
///         let update: SubscriptionUpdated = event.payload_as()?;
///         // Refresh the banner...
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "RoomLimitBanner"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process an event.
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Token returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub u64);

/// Port for subscribing to published events.
///
/// ```ignore
/// let id = subscriber.subscribe(SUBSCRIPTION_UPDATED, banner);
/// // ...
/// subscriber.unsubscribe(id);
/// ```
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to a specific event type.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) -> HandlerId;

    /// Remove a previously registered handler. Returns false if the id was
    /// unknown or already removed.
    fn unsubscribe(&self, id: HandlerId) -> bool;
}

/// Combined trait for event bus implementations.
pub trait EventBus: super::EventPublisher + EventSubscriber {}

impl<T: super::EventPublisher + EventSubscriber> EventBus for T {}

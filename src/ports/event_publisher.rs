//! EventPublisher port - Interface for the notification sink.
//!
//! The coordinator publishes plan changes without knowing whether they go
//! to in-process observers, Redis, or both.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing notifications.
///
/// Publishing is fire-and-forget from the coordinator's point of view: an
/// error is logged, never surfaced to the purchase caller.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish several events in order, stopping at the first failure.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

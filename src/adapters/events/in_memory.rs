//! In-memory notification sink.
//!
//! In-process publish/subscribe for plan changes. Delivery is in-line and
//! in subscription order, so tests can assert on it deterministically.
//!
//! Published envelopes are kept in a bounded history for assertions. Hosts
//! that only need in-process fan-out should build the bus with
//! [`InMemoryEventBus::without_history`]; cross-process delivery belongs to
//! `RedisEventPublisher`.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::warn;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber, HandlerId};

type Subscriptions = HashMap<String, Vec<(HandlerId, Arc<dyn EventHandler>)>>;

/// In-memory event bus.
///
/// Features:
/// - In-line delivery (deterministic for tests)
/// - Event capture for assertions, oldest dropped past the history limit
/// - Handler registration and removal by id
///
/// # Example
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// let id = bus.subscribe(SUBSCRIPTION_UPDATED, banner);
///
/// bus.publish(envelope).await?;
///
/// assert_eq!(bus.event_count(), 1);
/// assert!(bus.has_event(SUBSCRIPTION_UPDATED));
/// bus.unsubscribe(id);
/// ```
pub struct InMemoryEventBus {
    handlers: RwLock<Subscriptions>,
    published: RwLock<VecDeque<EventEnvelope>>,
    history_limit: usize,
    next_id: AtomicU64,
}

/// Envelopes retained by [`InMemoryEventBus::new`].
pub const DEFAULT_HISTORY_LIMIT: usize = 1024;

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Keeps at most `limit` published envelopes; 0 disables capture.
    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            published: RwLock::new(VecDeque::new()),
            history_limit: limit,
            next_id: AtomicU64::new(1),
        }
    }

    /// Delivers to handlers without recording anything.
    pub fn without_history() -> Self {
        Self::with_history_limit(0)
    }

    // === Test Helpers ===

    /// Returns the retained published events, oldest first.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Returns events of a specific type.
    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Returns events for one user's subscription.
    pub fn events_for_aggregate(&self, aggregate_id: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .collect()
    }

    /// Clears all published events (for test isolation).
    pub fn clear(&self) {
        self.published
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn event_count(&self) -> usize {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|e| e.event_type == event_type)
    }

    /// Number of handlers registered for an event type.
    pub fn handler_count(&self, event_type: &str) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_type)
            .map_or(0, Vec::len)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        if self.history_limit > 0 {
            let mut published = self
                .published
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if published.len() == self.history_limit {
                published.pop_front();
            }
            published.push_back(event.clone());
        }

        // Clone handlers to release lock before await points
        let type_handlers: Vec<Arc<dyn EventHandler>> = {
            let handlers = self
                .handlers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            handlers
                .get(&event.event_type)
                .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };

        // A failing handler does not stop delivery to the rest
        let mut errors = Vec::new();
        for handler in type_handlers {
            if let Err(e) = handler.handle(event.clone()).await {
                warn!(handler = handler.name(), error = %e, "Event handler failed");
                errors.push(format!("{}: {}", handler.name(), e));
            }
        }

        if !errors.is_empty() {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                format!("Handler errors: {}", errors.join(", ")),
            ));
        }

        Ok(())
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_type.to_string())
            .or_default()
            .push((id, handler));
        id
    }

    fn unsubscribe(&self, id: HandlerId) -> bool {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut removed = false;
        for list in handlers.values_mut() {
            let before = list.len();
            list.retain(|(handler_id, _)| *handler_id != id);
            removed |= list.len() != before;
        }
        handlers.retain(|_, list| !list.is_empty());
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{SerializableDomainEvent, UserId};
    use crate::domain::subscription::{
        PlanTier, ReconciliationResult, SubscriptionUpdated, SUBSCRIPTION_UPDATED,
    };
    use std::sync::atomic::AtomicUsize;

    struct CountingHandler {
        count: AtomicUsize,
    }

    impl CountingHandler {
        fn new() -> Self {
            Self {
                count: AtomicUsize::new(0),
            }
        }

        fn count(&self) -> usize {
            self.count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EventHandler for CountingHandler {
        async fn handle(&self, _event: EventEnvelope) -> Result<(), DomainError> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "CountingHandler"
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl EventHandler for FailingHandler {
        async fn handle(&self, _event: EventEnvelope) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::InternalError, "boom"))
        }

        fn name(&self) -> &'static str {
            "FailingHandler"
        }
    }

    fn update_envelope(limit_tier: PlanTier) -> EventEnvelope {
        SubscriptionUpdated::new(
            UserId::new("u1").unwrap(),
            &ReconciliationResult::for_tier(limit_tier),
        )
        .to_envelope()
        .unwrap()
    }

    #[tokio::test]
    async fn publish_stores_event() {
        let bus = InMemoryEventBus::new();

        bus.publish(update_envelope(PlanTier::Tier1)).await.unwrap();

        assert_eq!(bus.event_count(), 1);
        assert!(bus.has_event(SUBSCRIPTION_UPDATED));
        assert_eq!(bus.events_for_aggregate("u1").len(), 1);
    }

    #[tokio::test]
    async fn publish_delivers_to_matching_handlers_only() {
        let bus = InMemoryEventBus::new();
        let matching = Arc::new(CountingHandler::new());
        let other = Arc::new(CountingHandler::new());
        bus.subscribe(SUBSCRIPTION_UPDATED, matching.clone());
        bus.subscribe("SomethingElse", other.clone());

        bus.publish(update_envelope(PlanTier::Tier2)).await.unwrap();

        assert_eq!(matching.count(), 1);
        assert_eq!(other.count(), 0);
    }

    #[tokio::test]
    async fn unsubscribed_handler_stops_receiving() {
        let bus = InMemoryEventBus::new();
        let handler = Arc::new(CountingHandler::new());
        let id = bus.subscribe(SUBSCRIPTION_UPDATED, handler.clone());

        bus.publish(update_envelope(PlanTier::Tier1)).await.unwrap();
        assert!(bus.unsubscribe(id));
        bus.publish(update_envelope(PlanTier::Tier2)).await.unwrap();

        assert_eq!(handler.count(), 1);
        assert_eq!(bus.handler_count(SUBSCRIPTION_UPDATED), 0);
        assert!(!bus.unsubscribe(id));
    }

    #[tokio::test]
    async fn failing_handler_does_not_block_others() {
        let bus = InMemoryEventBus::new();
        let counter = Arc::new(CountingHandler::new());
        bus.subscribe(SUBSCRIPTION_UPDATED, Arc::new(FailingHandler));
        bus.subscribe(SUBSCRIPTION_UPDATED, counter.clone());

        let result = bus.publish(update_envelope(PlanTier::Tier3)).await;

        assert!(result.is_err());
        assert_eq!(counter.count(), 1);
        assert_eq!(bus.event_count(), 1);
    }

    #[tokio::test]
    async fn clear_removes_published_events() {
        let bus = InMemoryEventBus::new();
        bus.publish(update_envelope(PlanTier::Tier1)).await.unwrap();

        bus.clear();

        assert_eq!(bus.event_count(), 0);
        assert!(bus.events_of_type(SUBSCRIPTION_UPDATED).is_empty());
    }

    #[tokio::test]
    async fn history_drops_oldest_past_limit() {
        let bus = InMemoryEventBus::with_history_limit(2);

        for tier in [PlanTier::Tier1, PlanTier::Tier2, PlanTier::Tier3] {
            bus.publish(update_envelope(tier)).await.unwrap();
        }

        let limits: Vec<u64> = bus
            .published_events()
            .iter()
            .map(|e| e.payload["limit"].as_u64().unwrap())
            .collect();
        assert_eq!(limits, vec![2, 3]);
    }

    #[tokio::test]
    async fn bus_without_history_still_delivers() {
        let bus = InMemoryEventBus::without_history();
        let handler = Arc::new(CountingHandler::new());
        bus.subscribe(SUBSCRIPTION_UPDATED, handler.clone());

        for _ in 0..10 {
            bus.publish(update_envelope(PlanTier::Tier4)).await.unwrap();
        }

        assert_eq!(handler.count(), 10);
        assert_eq!(bus.event_count(), 0);
        assert!(!bus.has_event(SUBSCRIPTION_UPDATED));
    }

    #[test]
    fn subscribe_hands_out_distinct_ids() {
        let bus = InMemoryEventBus::new();
        let a = bus.subscribe(SUBSCRIPTION_UPDATED, Arc::new(CountingHandler::new()));
        let b = bus.subscribe(SUBSCRIPTION_UPDATED, Arc::new(CountingHandler::new()));
        assert_ne!(a, b);
        assert_eq!(bus.handler_count(SUBSCRIPTION_UPDATED), 2);
    }
}

//! Notification sink adapters.
//!
//! - `InMemoryEventBus` - In-process publish/subscribe, also used by tests
//! - `RedisEventPublisher` - Cross-process fan-out over Redis pub/sub

mod in_memory;
mod redis_publisher;

pub use in_memory::{InMemoryEventBus, DEFAULT_HISTORY_LIMIT};
pub use redis_publisher::RedisEventPublisher;

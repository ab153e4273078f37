//! Redis-backed notification publisher.
//!
//! Fans plan changes out to other processes (web dashboard, push service)
//! with PUBLISH on a channel per event type. Delivery is at-most-once:
//! subscribers that are not connected miss the message.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::config::RedisConfig;
use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

/// Publishes event envelopes as JSON on `<prefix>:<event_type>`.
#[derive(Clone)]
pub struct RedisEventPublisher {
    conn: MultiplexedConnection,
    channel_prefix: String,
}

impl RedisEventPublisher {
    pub fn new(conn: MultiplexedConnection, channel_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            channel_prefix: channel_prefix.into(),
        }
    }

    /// Opens a multiplexed connection using `config`, bounded by its timeout.
    pub async fn connect(config: &RedisConfig) -> Result<Self, DomainError> {
        let client = redis::Client::open(config.url.as_str()).map_err(|e| {
            DomainError::new(ErrorCode::Configuration, format!("Invalid Redis URL: {}", e))
        })?;

        let conn = tokio::time::timeout(config.timeout(), client.get_multiplexed_tokio_connection())
            .await
            .map_err(|_| DomainError::new(ErrorCode::CacheError, "Redis connection timed out"))?
            .map_err(|e| {
                DomainError::new(ErrorCode::CacheError, format!("Redis connection failed: {}", e))
            })?;

        info!(prefix = %config.channel_prefix, "Connected plan-change publisher to Redis");
        Ok(Self::new(conn, config.channel_prefix.clone()))
    }

    /// Channel an event type is published on.
    pub fn channel_for(&self, event_type: &str) -> String {
        channel_name(&self.channel_prefix, event_type)
    }
}

fn channel_name(prefix: &str, event_type: &str) -> String {
    if prefix.is_empty() {
        event_type.to_string()
    } else {
        format!("{}:{}", prefix, event_type)
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let channel = self.channel_for(&event.event_type);
        let payload = serde_json::to_string(&event).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize event: {}", e),
            )
        })?;

        let mut conn = self.conn.clone();
        let receivers: i64 = conn
            .publish(&channel, payload)
            .await
            .map_err(|e: redis::RedisError| {
                DomainError::new(ErrorCode::CacheError, format!("Redis publish failed: {}", e))
            })?;

        debug!(channel = %channel, receivers, event_id = %event.event_id, "Published event");
        Ok(())
    }
}

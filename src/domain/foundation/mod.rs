//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, event infrastructure and error types
//! shared by the subscription domain and the ports.

mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{
    domain_event, DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use ids::{ProfileRecordId, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;

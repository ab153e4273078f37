//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the subscription domain to external systems:
//! - `commerce` - Commerce backend (mock store account)
//! - `events` - Notification sinks (in-memory, Redis)
//! - `identity` - Signed-in identity holder
//! - `launcher` - URL launcher
//! - `profile` - Profile stores (in-memory, PostgreSQL)

pub mod commerce;
pub mod events;
pub mod identity;
pub mod launcher;
pub mod profile;

pub use commerce::MockCommerceBackend;
pub use events::{InMemoryEventBus, RedisEventPublisher};
pub use identity::StaticIdentityProvider;
pub use launcher::RecordingLauncher;
pub use profile::{InMemoryProfileStore, PostgresProfileStore};

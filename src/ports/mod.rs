//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the subscription domain and its external collaborators. Adapters
//! implement these ports.
//!
//! - `CommerceBackend` - In-app purchase SDK (offerings, purchase, restore)
//! - `ProfileStore` - Remote user-profile records
//! - `IdentityProvider` - Currently signed-in identity
//! - `EventPublisher` / `EventSubscriber` - Notification sink
//! - `SystemLauncher` - Opens external URLs

mod commerce_backend;
mod event_publisher;
mod event_subscriber;
mod identity_provider;
mod profile_store;
mod system_launcher;

pub use commerce_backend::{
    CommerceBackend, CommerceError, CommerceErrorCode, EntitlementSnapshot, Offering, Offerings,
    Package, PurchaseResult,
};
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber, HandlerId};
pub use identity_provider::IdentityProvider;
pub use profile_store::{PlanFields, ProfileHandle, ProfileStore};
pub use system_launcher::SystemLauncher;

//! Application layer - Commands, Queries, and Handlers.
//!
//! Orchestrates the subscription domain across the ports. The
//! `SubscriptionCoordinator` is the facade host apps use; the handlers
//! behind it are public so they can be composed differently.

mod coordinator;
pub mod handlers;
mod plan_state;

pub use coordinator::{
    CoordinatorPorts, CoordinatorSettings, InitializeHandle, InitializeSummary,
    SubscriptionCoordinator,
};
pub use handlers::{PersistenceStatus, ReconcileReport};
pub use plan_state::{ListenerId, PlanStateHolder, PlanStateListener};

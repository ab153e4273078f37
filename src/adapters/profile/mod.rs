//! Profile store adapters.
//!
//! - `InMemoryProfileStore` - Map-backed store for tests and local runs
//! - `PostgresProfileStore` - `users` table via sqlx

mod in_memory;
mod postgres;

pub use in_memory::{InMemoryProfileStore, StoredProfile};
pub use postgres::PostgresProfileStore;

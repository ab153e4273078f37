//! Commerce backend adapters.

mod mock_backend;

pub use mock_backend::{MethodCall, MockCommerceBackend};

//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, events, errors)
//! - `subscription` - Plan tiers, entitlement resolution, outcomes

pub mod foundation;
pub mod subscription;

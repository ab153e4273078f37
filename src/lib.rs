//! Room Subscriptions - entitlement reconciliation for in-app purchases
//!
//! Maps the entitlements a commerce backend reports for a user onto a
//! room-limit plan, saves that plan to the user's profile and announces
//! the change to observers.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

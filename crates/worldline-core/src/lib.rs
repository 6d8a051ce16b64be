//! # worldline-core
//!
//! Shared domain types for the worldline scenario service.
//!
//! - Branded ID newtypes ([`ids`]) — prefixed UUID v7 identifiers for
//!   users, events, and objects
//! - [`ObjectKind`] — the enumerated kind of a simulation object

#![deny(unsafe_code)]

pub mod ids;
pub mod kind;

pub use ids::{EventId, ObjectId, UserId};
pub use kind::ObjectKind;

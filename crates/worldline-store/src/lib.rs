//! # worldline-store
//!
//! `SQLite`-backed persistence for the worldline scenario service.
//!
//! Three layers, bottom to top:
//!
//! - **[`sqlite`]**: connection pool, embedded migrations, raw row types,
//!   and stateless repositories (every method takes `&Connection`).
//! - **[`store::reconcile`]**: the nested object reconciliation engine —
//!   synchronizes a submitted object list against the persisted set for
//!   one event (validate, delete-missing, update-existing, create-new).
//! - **[`store::EventStore`]**: the transactional facade. Every method
//!   takes the caller's user ID explicitly and scopes all reads and
//!   writes to that user's events.

#![deny(unsafe_code)]

pub mod errors;
pub mod sqlite;
pub mod store;

pub use errors::{Result, StoreError};
pub use sqlite::connection::{ConnectionConfig, ConnectionPool, new_file, new_in_memory};
pub use sqlite::migrations::run_migrations;
pub use store::event_store::{CreateEventOptions, EventDetail, EventStore, UpdateEventOptions};
pub use store::reconcile::{ObjectEntry, ReconcileSummary};

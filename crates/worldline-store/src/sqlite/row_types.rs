//! Database row types for mapping between `SQLite` rows and Rust structs.
//!
//! These represent the raw database row shape — not the wire
//! representations. Conversion to wire types happens in the HTTP layer.

use serde::{Deserialize, Serialize};
use worldline_core::ObjectKind;

/// Raw user row from the `users` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRow {
    /// User ID (`usr_…`).
    pub id: String,
    /// Unique username.
    pub username: String,
    /// Bearer credential resolved on every request.
    pub token: String,
    /// Creation timestamp (RFC 3339).
    pub created_at: String,
}

/// Raw event row from the `events` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRow {
    /// Event ID (`evt_…`).
    pub id: String,
    /// Owning user ID; immutable after creation.
    pub user_id: String,
    /// Free-text label.
    pub name: String,
    /// Global simulation time parameter.
    pub current_time: f64,
    /// Global reference-frame velocity parameter.
    pub current_reference_frame: f64,
    /// Creation timestamp (RFC 3339), set once.
    pub created_at: String,
    /// Refreshed on every mutation.
    pub updated_at: String,
}

/// Raw object row from the `objects` table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectRow {
    /// Object ID (`obj_…`) — the reconciliation key.
    pub id: String,
    /// Owning event ID.
    pub event_id: String,
    /// Caller-supplied secondary identifier; not unique.
    pub object_id: Option<i64>,
    /// Object kind (box / clock / flash).
    pub kind: ObjectKind,
    /// Velocity in the lab frame.
    pub velocity_lab: f64,
    /// Initial position in the lab frame.
    pub x0_lab: f64,
    /// Initial time in the lab frame.
    pub t0_lab: f64,
    /// Creation timestamp; drives ordered-by-creation listing.
    pub created_at: String,
}

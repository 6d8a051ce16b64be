//! Event repository — scenario rows, always scoped by owner.
//!
//! Every lookup, update, and delete is qualified by `user_id`. An event
//! owned by another user is indistinguishable from an absent one at this
//! layer; callers translate the miss into a not-found error.

use rusqlite::{Connection, OptionalExtension, params};
use worldline_core::EventId;

use crate::errors::Result;
use crate::sqlite::row_types::EventRow;

/// Options for creating a new event.
pub struct CreateEventRowOptions<'a> {
    /// Owning user; forced to the authenticated caller by the facade.
    pub user_id: &'a str,
    /// Free-text label.
    pub name: &'a str,
    /// Global simulation time parameter (default 0.0).
    pub current_time: f64,
    /// Global reference-frame velocity parameter (default 0.0).
    pub current_reference_frame: f64,
}

/// Partial scalar update; only present fields are written.
///
/// `updated_at` is refreshed unconditionally, even for an empty patch —
/// an update request that only reconciles objects still counts as a
/// mutation of the event.
#[derive(Default)]
pub struct EventPatch<'a> {
    /// New label, if submitted.
    pub name: Option<&'a str>,
    /// New simulation time, if submitted.
    pub current_time: Option<f64>,
    /// New reference-frame parameter, if submitted.
    pub current_reference_frame: Option<f64>,
}

/// Event repository — stateless, every method takes `&Connection`.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event.
    pub fn create(conn: &Connection, opts: &CreateEventRowOptions<'_>) -> Result<EventRow> {
        let id = EventId::generate().into_inner();
        let now = chrono::Utc::now().to_rfc3339();

        let _ = conn.execute(
            "INSERT INTO events (id, user_id, name, \"current_time\", current_reference_frame,
             created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                opts.user_id,
                opts.name,
                opts.current_time,
                opts.current_reference_frame,
                now,
                now,
            ],
        )?;

        Ok(EventRow {
            id,
            user_id: opts.user_id.to_owned(),
            name: opts.name.to_owned(),
            current_time: opts.current_time,
            current_reference_frame: opts.current_reference_frame,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Get an event by ID, scoped to its owner.
    pub fn get_scoped(conn: &Connection, event_id: &str, user_id: &str) -> Result<Option<EventRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM events WHERE id = ?1 AND user_id = ?2",
                params![event_id, user_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// List a user's events, newest-created first.
    pub fn list_for_user(conn: &Connection, user_id: &str) -> Result<Vec<EventRow>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM events WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt
            .query_map(params![user_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Apply a partial scalar update, scoped to the owner.
    ///
    /// Returns `false` when no row matched (absent or foreign-owned).
    pub fn update_scoped(
        conn: &Connection,
        event_id: &str,
        user_id: &str,
        patch: &EventPatch<'_>,
    ) -> Result<bool> {
        let mut sets = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(name) = patch.name {
            values.push(Box::new(name.to_owned()));
            sets.push(format!("name = ?{}", values.len()));
        }
        if let Some(t) = patch.current_time {
            values.push(Box::new(t));
            sets.push(format!("\"current_time\" = ?{}", values.len()));
        }
        if let Some(frame) = patch.current_reference_frame {
            values.push(Box::new(frame));
            sets.push(format!("current_reference_frame = ?{}", values.len()));
        }

        values.push(Box::new(chrono::Utc::now().to_rfc3339()));
        sets.push(format!("updated_at = ?{}", values.len()));

        values.push(Box::new(event_id.to_owned()));
        let id_idx = values.len();
        values.push(Box::new(user_id.to_owned()));
        let user_idx = values.len();

        let sql = format!(
            "UPDATE events SET {} WHERE id = ?{id_idx} AND user_id = ?{user_idx}",
            sets.join(", ")
        );
        let values_refs: Vec<&dyn rusqlite::types::ToSql> =
            values.iter().map(Box::as_ref).collect();
        let changed = conn.execute(&sql, values_refs.as_slice())?;
        Ok(changed > 0)
    }

    /// Delete an event, scoped to the owner. Objects cascade via FK.
    pub fn delete_scoped(conn: &Connection, event_id: &str, user_id: &str) -> Result<bool> {
        let changed = conn.execute(
            "DELETE FROM events WHERE id = ?1 AND user_id = ?2",
            params![event_id, user_id],
        )?;
        Ok(changed > 0)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRow> {
        Ok(EventRow {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            current_time: row.get("current_time")?,
            current_reference_frame: row.get("current_reference_frame")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

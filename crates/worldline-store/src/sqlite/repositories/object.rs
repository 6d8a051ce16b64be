//! Object repository — kinematic object rows, always scoped by event.
//!
//! Updates and deletes are qualified by `event_id`: an object ID
//! belonging to a different event can never be mutated through this
//! repository, which is what keeps reconciliation ownership-safe.

use rusqlite::{Connection, params};
use worldline_core::{ObjectId, ObjectKind};

use crate::errors::Result;
use crate::sqlite::row_types::ObjectRow;

/// Field values for inserting a new object.
pub struct NewObjectRow {
    /// Caller-supplied secondary identifier.
    pub object_id: Option<i64>,
    /// Object kind.
    pub kind: ObjectKind,
    /// Velocity in the lab frame.
    pub velocity_lab: f64,
    /// Initial position in the lab frame.
    pub x0_lab: f64,
    /// Initial time in the lab frame.
    pub t0_lab: f64,
}

/// Partial update; only present fields are written.
#[derive(Default)]
pub struct ObjectRowPatch {
    /// New secondary identifier, if submitted.
    pub object_id: Option<i64>,
    /// New kind, if submitted.
    pub kind: Option<ObjectKind>,
    /// New lab-frame velocity, if submitted.
    pub velocity_lab: Option<f64>,
    /// New lab-frame initial position, if submitted.
    pub x0_lab: Option<f64>,
    /// New lab-frame initial time, if submitted.
    pub t0_lab: Option<f64>,
}

/// Object repository — stateless, every method takes `&Connection`.
pub struct ObjectRepo;

impl ObjectRepo {
    /// Insert a new object attached to the given event.
    ///
    /// Fails with a foreign-key error if the event does not exist.
    pub fn create(conn: &Connection, event_id: &str, new: &NewObjectRow) -> Result<ObjectRow> {
        let id = ObjectId::generate().into_inner();
        let now = chrono::Utc::now().to_rfc3339();

        let _ = conn.execute(
            "INSERT INTO objects (id, event_id, object_id, kind, velocity_lab, x0_lab, t0_lab, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                event_id,
                new.object_id,
                new.kind.as_str(),
                new.velocity_lab,
                new.x0_lab,
                new.t0_lab,
                now,
            ],
        )?;

        Ok(ObjectRow {
            id,
            event_id: event_id.to_owned(),
            object_id: new.object_id,
            kind: new.kind,
            velocity_lab: new.velocity_lab,
            x0_lab: new.x0_lab,
            t0_lab: new.t0_lab,
            created_at: now,
        })
    }

    /// List an event's objects in creation order.
    pub fn list_for_event(conn: &Connection, event_id: &str) -> Result<Vec<ObjectRow>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM objects WHERE event_id = ?1 ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt
            .query_map(params![event_id], Self::map_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Apply a partial update, scoped to the owning event.
    ///
    /// Returns `false` when no row matched — the ID is absent or belongs
    /// to a different event. An empty patch is a no-op that still reports
    /// whether the row exists.
    pub fn update_scoped(
        conn: &Connection,
        object_pk: &str,
        event_id: &str,
        patch: &ObjectRowPatch,
    ) -> Result<bool> {
        let mut sets = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(object_id) = patch.object_id {
            values.push(Box::new(object_id));
            sets.push(format!("object_id = ?{}", values.len()));
        }
        if let Some(kind) = patch.kind {
            values.push(Box::new(kind.as_str().to_owned()));
            sets.push(format!("kind = ?{}", values.len()));
        }
        if let Some(v) = patch.velocity_lab {
            values.push(Box::new(v));
            sets.push(format!("velocity_lab = ?{}", values.len()));
        }
        if let Some(x0) = patch.x0_lab {
            values.push(Box::new(x0));
            sets.push(format!("x0_lab = ?{}", values.len()));
        }
        if let Some(t0) = patch.t0_lab {
            values.push(Box::new(t0));
            sets.push(format!("t0_lab = ?{}", values.len()));
        }

        if sets.is_empty() {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM objects WHERE id = ?1 AND event_id = ?2)",
                params![object_pk, event_id],
                |row| row.get(0),
            )?;
            return Ok(exists);
        }

        values.push(Box::new(object_pk.to_owned()));
        let id_idx = values.len();
        values.push(Box::new(event_id.to_owned()));
        let event_idx = values.len();

        let sql = format!(
            "UPDATE objects SET {} WHERE id = ?{id_idx} AND event_id = ?{event_idx}",
            sets.join(", ")
        );
        let values_refs: Vec<&dyn rusqlite::types::ToSql> =
            values.iter().map(Box::as_ref).collect();
        let changed = conn.execute(&sql, values_refs.as_slice())?;
        Ok(changed > 0)
    }

    /// Delete every object of the event whose ID is not in `keep`.
    ///
    /// An empty `keep` deletes all of the event's objects — this is the
    /// documented destructive default of reconciliation, not a special case.
    /// Returns the number of rows deleted.
    pub fn delete_not_in(conn: &Connection, event_id: &str, keep: &[&str]) -> Result<usize> {
        if keep.is_empty() {
            let deleted =
                conn.execute("DELETE FROM objects WHERE event_id = ?1", params![event_id])?;
            return Ok(deleted);
        }

        let placeholders: Vec<String> = (2..=keep.len() + 1).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "DELETE FROM objects WHERE event_id = ?1 AND id NOT IN ({})",
            placeholders.join(", ")
        );

        let mut values: Vec<&dyn rusqlite::types::ToSql> = vec![&event_id];
        for id in keep {
            values.push(id);
        }
        let deleted = conn.execute(&sql, values.as_slice())?;
        Ok(deleted)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ObjectRow> {
        let kind_str: String = row.get("kind")?;
        let kind = kind_str.parse::<ObjectKind>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;
        Ok(ObjectRow {
            id: row.get("id")?,
            event_id: row.get("event_id")?,
            object_id: row.get("object_id")?,
            kind,
            velocity_lab: row.get("velocity_lab")?,
            x0_lab: row.get("x0_lab")?,
            t0_lab: row.get("t0_lab")?,
            created_at: row.get("created_at")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

//! Nested object reconciliation engine.
//!
//! Given an event and a submitted list of object entries, synchronizes the
//! persisted object set to match: delete rows not resubmitted by ID,
//! partially update resubmitted rows, insert entries without an ID.
//!
//! The caller wraps [`reconcile`] in a transaction together with the event's
//! scalar update, so a mid-batch failure never leaves a partial object set.
//! [`validate`] checks the whole batch up front — one invalid entry aborts
//! the write before anything is touched.
//!
//! An empty submission (or one where every entry omits its ID) deletes all
//! existing objects. That destructive default is deliberate and documented:
//! the submitted list is the complete desired state, not a delta.

use rusqlite::Connection;
use tracing::{debug, warn};
use worldline_core::ObjectKind;

use crate::errors::{Result, StoreError};
use crate::sqlite::repositories::object::{NewObjectRow, ObjectRepo, ObjectRowPatch};

/// One submitted object entry.
///
/// An entry with `id` targets an existing row for partial update; without
/// `id` it requests a new row, in which case the three kinematic fields
/// are required.
#[derive(Clone, Debug, Default)]
pub struct ObjectEntry {
    /// Persisted object ID — the reconciliation key. `None` means create.
    pub id: Option<String>,
    /// Caller-supplied secondary identifier.
    pub object_id: Option<i64>,
    /// Object kind; defaults to box on create.
    pub kind: Option<ObjectKind>,
    /// Velocity in the lab frame.
    pub velocity_lab: Option<f64>,
    /// Initial position in the lab frame.
    pub x0_lab: Option<f64>,
    /// Initial time in the lab frame.
    pub t0_lab: Option<f64>,
}

/// Counts of what one reconciliation pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Rows inserted for entries without an ID.
    pub created: usize,
    /// Rows matched and updated for entries with an ID.
    pub updated: usize,
    /// Rows deleted because their ID was not resubmitted.
    pub deleted: usize,
    /// With-ID entries whose target was not found under the event.
    ///
    /// These are silent no-ops on the wire, but counted and logged so a
    /// client sending stale IDs is visible in the server logs.
    pub missed: usize,
}

/// Validate a submitted batch before any mutation.
///
/// Rules per entry:
/// - every provided kinematic field must be a finite number;
/// - entries without `id` must provide all three kinematic fields;
/// - `object_id` is unconstrained beyond being an integer;
/// - `kind` is enforced by the type system (deserialization rejects
///   unknown variants).
///
/// The first violation aborts the whole batch with
/// [`StoreError::Validation`] carrying the `objects[i].field` path.
pub fn validate(entries: &[ObjectEntry]) -> Result<()> {
    for (index, entry) in entries.iter().enumerate() {
        let required = entry.id.is_none();
        check_field(index, "velocityLab", entry.velocity_lab, required)?;
        check_field(index, "x0Lab", entry.x0_lab, required)?;
        check_field(index, "t0Lab", entry.t0_lab, required)?;
    }
    Ok(())
}

fn check_field(index: usize, name: &str, value: Option<f64>, required: bool) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() => Err(StoreError::Validation {
            field: format!("objects[{index}].{name}"),
            message: "must be a finite number".into(),
        }),
        None if required => Err(StoreError::Validation {
            field: format!("objects[{index}].{name}"),
            message: "required".into(),
        }),
        _ => Ok(()),
    }
}

/// Synchronize the event's persisted objects with the submitted batch.
///
/// Must run inside the caller's transaction and after [`validate`].
/// Order matters: deletes first (so the NOT IN set is exact), then
/// updates, then creates.
pub fn reconcile(
    conn: &Connection,
    event_id: &str,
    entries: &[ObjectEntry],
) -> Result<ReconcileSummary> {
    let mut summary = ReconcileSummary::default();

    // 1. Delete every persisted object not resubmitted by ID.
    let keep: Vec<&str> = entries
        .iter()
        .filter_map(|e| e.id.as_deref())
        .collect();
    summary.deleted = ObjectRepo::delete_not_in(conn, event_id, &keep)?;

    // 2. Partial-update resubmitted rows, 3. insert the rest.
    for (index, entry) in entries.iter().enumerate() {
        if let Some(id) = entry.id.as_deref() {
            let patch = ObjectRowPatch {
                object_id: entry.object_id,
                kind: entry.kind,
                velocity_lab: entry.velocity_lab,
                x0_lab: entry.x0_lab,
                t0_lab: entry.t0_lab,
            };
            if ObjectRepo::update_scoped(conn, id, event_id, &patch)? {
                summary.updated += 1;
            } else {
                // Target absent or owned by another event. The original
                // behavior is a silent skip; keep it, but make it visible.
                warn!(object = id, event = event_id, "reconcile target not found, skipping");
                summary.missed += 1;
            }
        } else {
            let _ = ObjectRepo::create(conn, event_id, &to_new_row(index, entry)?)?;
            summary.created += 1;
        }
    }

    debug!(
        event = event_id,
        created = summary.created,
        updated = summary.updated,
        deleted = summary.deleted,
        missed = summary.missed,
        "reconciled object set"
    );
    Ok(summary)
}

/// Insert every entry as a new object, ignoring submitted IDs.
///
/// Create mode for a brand-new event: there is no prior state to diff
/// against, and object IDs are system-assigned.
pub fn create_all(conn: &Connection, event_id: &str, entries: &[ObjectEntry]) -> Result<usize> {
    for (index, entry) in entries.iter().enumerate() {
        let _ = ObjectRepo::create(conn, event_id, &to_new_row(index, entry)?)?;
    }
    Ok(entries.len())
}

fn to_new_row(index: usize, entry: &ObjectEntry) -> Result<NewObjectRow> {
    let require = |name: &str, value: Option<f64>| {
        value.ok_or_else(|| StoreError::Validation {
            field: format!("objects[{index}].{name}"),
            message: "required".into(),
        })
    };
    Ok(NewObjectRow {
        object_id: entry.object_id,
        kind: entry.kind.unwrap_or_default(),
        velocity_lab: require("velocityLab", entry.velocity_lab)?,
        x0_lab: require("x0Lab", entry.x0_lab)?,
        t0_lab: require("t0Lab", entry.t0_lab)?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

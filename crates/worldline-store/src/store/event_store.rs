//! High-level transactional `EventStore` API.
//!
//! Composes the repositories into caller-scoped, atomic operations. Every
//! method takes the caller's user ID explicitly — there is no ambient
//! current user — and every write runs inside a single `SQLite`
//! transaction, so callers never observe partial state.
//!
//! Ownership is enforced by scoping, not by checks-then-acts: an event
//! owned by another user simply never matches a scoped query, and the
//! resulting miss is reported as [`StoreError::EventNotFound`]. Existence
//! of other users' events is never disclosed.

use rand::Rng;
use rand::distr::Alphanumeric;

use crate::errors::{Result, StoreError};
use crate::sqlite::connection::{ConnectionPool, PooledConnection};
use crate::sqlite::repositories::event::{CreateEventRowOptions, EventPatch, EventRepo};
use crate::sqlite::repositories::object::ObjectRepo;
use crate::sqlite::repositories::user::UserRepo;
use crate::sqlite::row_types::{EventRow, ObjectRow, UserRow};
use crate::store::reconcile::{self, ObjectEntry};

/// Length of generated bearer tokens.
const TOKEN_LEN: usize = 40;

/// Options for creating an event.
pub struct CreateEventOptions<'a> {
    /// Free-text label.
    pub name: &'a str,
    /// Global simulation time (default 0.0 at the API layer).
    pub current_time: f64,
    /// Global reference-frame parameter (default 0.0 at the API layer).
    pub current_reference_frame: f64,
    /// Embedded object list; submitted IDs are ignored in create mode.
    pub objects: &'a [ObjectEntry],
}

/// Options for updating an event.
///
/// Scalar fields are partial: only present values are written. The object
/// list is the complete desired state — an empty slice (the default when
/// the wire payload omits `objects`) deletes every persisted object.
#[derive(Default)]
pub struct UpdateEventOptions<'a> {
    /// New label, if submitted.
    pub name: Option<&'a str>,
    /// New simulation time, if submitted.
    pub current_time: Option<f64>,
    /// New reference-frame parameter, if submitted.
    pub current_reference_frame: Option<f64>,
    /// Desired object set, reconciled against persisted rows.
    pub objects: &'a [ObjectEntry],
}

/// A fully-assembled event: row, owner's username, and objects in
/// creation order.
#[derive(Clone, Debug)]
pub struct EventDetail {
    /// The event row.
    pub event: EventRow,
    /// The owner's username (read-only on the wire).
    pub username: String,
    /// The event's objects, ordered by creation.
    pub objects: Vec<ObjectRow>,
}

/// High-level store wrapping a connection pool and all repositories.
pub struct EventStore {
    pool: ConnectionPool,
}

impl EventStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Get a connection from the pool.
    fn conn(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────

    /// Provision a user with a fresh bearer token.
    ///
    /// Integration point for the external identity provider; there is no
    /// HTTP surface for this.
    pub fn create_user(&self, username: &str) -> Result<UserRow> {
        let token: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        let conn = self.conn()?;
        UserRepo::create(&conn, username, &token)
    }

    /// Resolve a bearer token to a user, if one matches.
    pub fn authenticate(&self, token: &str) -> Result<Option<UserRow>> {
        let conn = self.conn()?;
        UserRepo::get_by_token(&conn, token)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────

    /// List the caller's events, newest-created first, each with objects.
    pub fn list_events(&self, user_id: &str) -> Result<Vec<EventDetail>> {
        let conn = self.conn()?;
        let username = Self::username(&conn, user_id)?;
        let rows = EventRepo::list_for_user(&conn, user_id)?;

        let mut details = Vec::with_capacity(rows.len());
        for event in rows {
            let objects = ObjectRepo::list_for_event(&conn, &event.id)?;
            details.push(EventDetail {
                event,
                username: username.clone(),
                objects,
            });
        }
        Ok(details)
    }

    /// Get one event by ID, scoped to the caller.
    pub fn get_event(&self, user_id: &str, event_id: &str) -> Result<EventDetail> {
        let conn = self.conn()?;
        Self::assemble(&conn, user_id, event_id)
    }

    /// Create an event owned by the caller, with its embedded objects.
    ///
    /// Atomic: the event row and all object rows are inserted in one
    /// transaction. The batch is validated before anything is written.
    pub fn create_event(&self, user_id: &str, opts: &CreateEventOptions<'_>) -> Result<EventDetail> {
        reconcile::validate(opts.objects)?;

        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        let event = EventRepo::create(
            &tx,
            &CreateEventRowOptions {
                user_id,
                name: opts.name,
                current_time: opts.current_time,
                current_reference_frame: opts.current_reference_frame,
            },
        )?;
        let _ = reconcile::create_all(&tx, &event.id, opts.objects)?;

        tx.commit()?;
        Self::assemble(&conn, user_id, &event.id)
    }

    /// Update an event's scalar fields and reconcile its object set.
    ///
    /// Atomic: scalar update, deletes, partial updates, and inserts all
    /// commit together or not at all. A validation failure aborts before
    /// any mutation; a missing or foreign-owned event yields
    /// [`StoreError::EventNotFound`].
    pub fn update_event(
        &self,
        user_id: &str,
        event_id: &str,
        opts: &UpdateEventOptions<'_>,
    ) -> Result<EventDetail> {
        reconcile::validate(opts.objects)?;

        let conn = self.conn()?;
        let tx = conn.unchecked_transaction()?;

        let Some(event) = EventRepo::get_scoped(&tx, event_id, user_id)? else {
            return Err(StoreError::EventNotFound(event_id.to_owned()));
        };

        let _ = EventRepo::update_scoped(
            &tx,
            &event.id,
            user_id,
            &EventPatch {
                name: opts.name,
                current_time: opts.current_time,
                current_reference_frame: opts.current_reference_frame,
            },
        )?;
        let _ = reconcile::reconcile(&tx, &event.id, opts.objects)?;

        tx.commit()?;
        Self::assemble(&conn, user_id, event_id)
    }

    /// Delete an event; its objects cascade away in the same transaction.
    pub fn delete_event(&self, user_id: &str, event_id: &str) -> Result<()> {
        let conn = self.conn()?;
        if EventRepo::delete_scoped(&conn, event_id, user_id)? {
            Ok(())
        } else {
            Err(StoreError::EventNotFound(event_id.to_owned()))
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────

    fn username(conn: &rusqlite::Connection, user_id: &str) -> Result<String> {
        Ok(UserRepo::get_by_id(conn, user_id)?
            .ok_or_else(|| StoreError::UserNotFound(user_id.to_owned()))?
            .username)
    }

    fn assemble(
        conn: &rusqlite::Connection,
        user_id: &str,
        event_id: &str,
    ) -> Result<EventDetail> {
        let Some(event) = EventRepo::get_scoped(conn, event_id, user_id)? else {
            return Err(StoreError::EventNotFound(event_id.to_owned()));
        };
        let username = Self::username(conn, user_id)?;
        let objects = ObjectRepo::list_for_event(conn, &event.id)?;
        Ok(EventDetail {
            event,
            username,
            objects,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::sqlite::connection::{ConnectionConfig, new_file};
    use crate::sqlite::migrations::run_migrations;
    use worldline_core::ObjectKind;

    fn open_store() -> (tempfile::TempDir, EventStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        let pool = new_file(path.to_str().unwrap(), &ConnectionConfig::default()).unwrap();
        {
            let conn = pool.get().unwrap();
            let _ = run_migrations(&conn).unwrap();
        }
        (dir, EventStore::new(pool))
    }

    fn box_entry(velocity: f64) -> ObjectEntry {
        ObjectEntry {
            kind: Some(ObjectKind::Box),
            velocity_lab: Some(velocity),
            x0_lab: Some(0.0),
            t0_lab: Some(0.0),
            ..Default::default()
        }
    }

    #[test]
    fn create_user_generates_token() {
        let (_dir, store) = open_store();
        let user = store.create_user("alice").unwrap();
        assert_eq!(user.token.len(), TOKEN_LEN);
        assert!(user.token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn authenticate_resolves_token() {
        let (_dir, store) = open_store();
        let user = store.create_user("alice").unwrap();

        let found = store.authenticate(&user.token).unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(store.authenticate("bogus").unwrap().is_none());
    }

    #[test]
    fn create_event_with_objects() {
        let (_dir, store) = open_store();
        let user = store.create_user("alice").unwrap();

        let detail = store
            .create_event(
                &user.id,
                &CreateEventOptions {
                    name: "Train",
                    current_time: 0.0,
                    current_reference_frame: 0.0,
                    objects: &[box_entry(0.6)],
                },
            )
            .unwrap();

        assert_eq!(detail.event.name, "Train");
        assert_eq!(detail.username, "alice");
        assert_eq!(detail.objects.len(), 1);
        assert_eq!(detail.objects[0].kind, ObjectKind::Box);
        assert!(detail.objects[0].id.starts_with("obj_"));
    }

    #[test]
    fn create_event_with_invalid_object_persists_nothing() {
        let (_dir, store) = open_store();
        let user = store.create_user("alice").unwrap();

        let invalid = ObjectEntry {
            velocity_lab: Some(0.6),
            ..Default::default()
        };
        let result = store.create_event(
            &user.id,
            &CreateEventOptions {
                name: "Broken",
                current_time: 0.0,
                current_reference_frame: 0.0,
                objects: &[box_entry(0.1), invalid],
            },
        );
        assert!(matches!(result, Err(StoreError::Validation { .. })));
        assert!(store.list_events(&user.id).unwrap().is_empty());
    }

    #[test]
    fn list_events_newest_first_per_user() {
        let (_dir, store) = open_store();
        let alice = store.create_user("alice").unwrap();
        let bob = store.create_user("bob").unwrap();

        let opts = |name| CreateEventOptions {
            name,
            current_time: 0.0,
            current_reference_frame: 0.0,
            objects: &[],
        };
        store.create_event(&alice.id, &opts("First")).unwrap();
        store.create_event(&alice.id, &opts("Second")).unwrap();
        store.create_event(&bob.id, &opts("Bob's")).unwrap();

        let events = store.list_events(&alice.id).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event.name, "Second");
        assert_eq!(events[1].event.name, "First");
    }

    #[test]
    fn foreign_event_is_not_found() {
        let (_dir, store) = open_store();
        let alice = store.create_user("alice").unwrap();
        let bob = store.create_user("bob").unwrap();

        let detail = store
            .create_event(
                &alice.id,
                &CreateEventOptions {
                    name: "Private",
                    current_time: 0.0,
                    current_reference_frame: 0.0,
                    objects: &[],
                },
            )
            .unwrap();

        let result = store.get_event(&bob.id, &detail.event.id);
        assert!(matches!(result, Err(StoreError::EventNotFound(_))));
    }

    #[test]
    fn update_event_scalars_and_objects() {
        let (_dir, store) = open_store();
        let user = store.create_user("alice").unwrap();
        let detail = store
            .create_event(
                &user.id,
                &CreateEventOptions {
                    name: "Train",
                    current_time: 0.0,
                    current_reference_frame: 0.0,
                    objects: &[box_entry(0.6)],
                },
            )
            .unwrap();
        let object_id = detail.objects[0].id.clone();

        let updated = store
            .update_event(
                &user.id,
                &detail.event.id,
                &UpdateEventOptions {
                    current_time: Some(2.5),
                    objects: &[ObjectEntry {
                        id: Some(object_id.clone()),
                        velocity_lab: Some(0.8),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
            )
            .unwrap();

        assert!((updated.event.current_time - 2.5).abs() < f64::EPSILON);
        assert_eq!(updated.event.name, "Train");
        assert_eq!(updated.objects.len(), 1);
        assert_eq!(updated.objects[0].id, object_id);
        assert!((updated.objects[0].velocity_lab - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn update_with_invalid_entry_leaves_object_set_intact() {
        let (_dir, store) = open_store();
        let user = store.create_user("alice").unwrap();
        let detail = store
            .create_event(
                &user.id,
                &CreateEventOptions {
                    name: "Train",
                    current_time: 0.0,
                    current_reference_frame: 0.0,
                    objects: &[box_entry(0.6)],
                },
            )
            .unwrap();

        // One valid create plus one invalid entry: nothing may change.
        let invalid = ObjectEntry {
            x0_lab: Some(1.0),
            ..Default::default()
        };
        let result = store.update_event(
            &user.id,
            &detail.event.id,
            &UpdateEventOptions {
                name: Some("Renamed"),
                objects: &[box_entry(0.2), invalid],
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(StoreError::Validation { .. })));

        let after = store.get_event(&user.id, &detail.event.id).unwrap();
        assert_eq!(after.event.name, "Train");
        assert_eq!(after.objects.len(), 1);
        assert_eq!(after.objects[0].id, detail.objects[0].id);
        assert!((after.objects[0].velocity_lab - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn update_missing_event_is_not_found() {
        let (_dir, store) = open_store();
        let user = store.create_user("alice").unwrap();

        let result = store.update_event(&user.id, "evt_missing", &UpdateEventOptions::default());
        assert!(matches!(result, Err(StoreError::EventNotFound(_))));
    }

    #[test]
    fn update_with_empty_objects_deletes_all() {
        let (_dir, store) = open_store();
        let user = store.create_user("alice").unwrap();
        let detail = store
            .create_event(
                &user.id,
                &CreateEventOptions {
                    name: "Train",
                    current_time: 0.0,
                    current_reference_frame: 0.0,
                    objects: &[box_entry(0.1), box_entry(0.2)],
                },
            )
            .unwrap();

        let updated = store
            .update_event(&user.id, &detail.event.id, &UpdateEventOptions::default())
            .unwrap();
        assert!(updated.objects.is_empty());
    }

    #[test]
    fn delete_event_cascades() {
        let (_dir, store) = open_store();
        let user = store.create_user("alice").unwrap();
        let detail = store
            .create_event(
                &user.id,
                &CreateEventOptions {
                    name: "Train",
                    current_time: 0.0,
                    current_reference_frame: 0.0,
                    objects: &[box_entry(0.6)],
                },
            )
            .unwrap();

        store.delete_event(&user.id, &detail.event.id).unwrap();

        let result = store.get_event(&user.id, &detail.event.id);
        assert!(matches!(result, Err(StoreError::EventNotFound(_))));
    }

    #[test]
    fn delete_foreign_event_is_not_found() {
        let (_dir, store) = open_store();
        let alice = store.create_user("alice").unwrap();
        let bob = store.create_user("bob").unwrap();
        let detail = store
            .create_event(
                &alice.id,
                &CreateEventOptions {
                    name: "Private",
                    current_time: 0.0,
                    current_reference_frame: 0.0,
                    objects: &[],
                },
            )
            .unwrap();

        let result = store.delete_event(&bob.id, &detail.event.id);
        assert!(matches!(result, Err(StoreError::EventNotFound(_))));
        assert!(store.get_event(&alice.id, &detail.event.id).is_ok());
    }

    #[test]
    fn updated_at_refreshes_on_update() {
        let (_dir, store) = open_store();
        let user = store.create_user("alice").unwrap();
        let detail = store
            .create_event(
                &user.id,
                &CreateEventOptions {
                    name: "Train",
                    current_time: 0.0,
                    current_reference_frame: 0.0,
                    objects: &[],
                },
            )
            .unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));
        let updated = store
            .update_event(
                &user.id,
                &detail.event.id,
                &UpdateEventOptions {
                    name: Some("Renamed"),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.event.created_at, detail.event.created_at);
        assert!(updated.event.updated_at > detail.event.updated_at);
    }
}

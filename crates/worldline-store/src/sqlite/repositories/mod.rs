//! Repository implementations for `SQLite` database operations.
//!
//! Each repository is a stateless struct whose methods take a `&Connection`
//! parameter. This makes every operation a pure function from
//! (connection, input) → output, trivially testable in isolation.
//!
//! Ownership scoping lives here: event lookups are qualified by `user_id`,
//! object mutations by `event_id`. Higher layers never issue an unscoped
//! mutation.

pub mod event;
pub mod object;
pub mod user;

#[cfg(test)]
pub(crate) mod testutil {
    use rusqlite::Connection;

    use crate::sqlite::migrations::run_migrations;
    use crate::sqlite::repositories::user::UserRepo;
    use crate::sqlite::row_types::UserRow;

    /// Open a migrated in-memory database.
    pub fn open_migrated() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;")
            .unwrap();
        let _ = run_migrations(&conn).unwrap();
        conn
    }

    /// Insert a user with a deterministic token for test setups.
    pub fn insert_user(conn: &Connection, username: &str) -> UserRow {
        UserRepo::create(conn, username, &format!("tok_{username}")).unwrap()
    }
}

//! User repository — account rows and bearer-token lookup.
//!
//! Users are provisioned out of band (the identity provider integration
//! point); this repository only creates rows and resolves credentials.

use rusqlite::{Connection, OptionalExtension, params};
use worldline_core::UserId;

use crate::errors::Result;
use crate::sqlite::row_types::UserRow;

/// User repository — stateless, every method takes `&Connection`.
pub struct UserRepo;

impl UserRepo {
    /// Create a new user with the given bearer token.
    pub fn create(conn: &Connection, username: &str, token: &str) -> Result<UserRow> {
        let id = UserId::generate().into_inner();
        let now = chrono::Utc::now().to_rfc3339();

        let _ = conn.execute(
            "INSERT INTO users (id, username, token, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id, username, token, now],
        )?;

        Ok(UserRow {
            id,
            username: username.to_owned(),
            token: token.to_owned(),
            created_at: now,
        })
    }

    /// Resolve a bearer token to a user, if one matches.
    pub fn get_by_token(conn: &Connection, token: &str) -> Result<Option<UserRow>> {
        let row = conn
            .query_row(
                "SELECT id, username, token, created_at FROM users WHERE token = ?1",
                params![token],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Get user by ID.
    pub fn get_by_id(conn: &Connection, user_id: &str) -> Result<Option<UserRow>> {
        let row = conn
            .query_row(
                "SELECT id, username, token, created_at FROM users WHERE id = ?1",
                params![user_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
        Ok(UserRow {
            id: row.get("id")?,
            username: row.get("username")?,
            token: row.get("token")?,
            created_at: row.get("created_at")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

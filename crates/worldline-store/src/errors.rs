//! Error types for the store subsystem.
//!
//! [`StoreError`] is the primary error type returned by all store
//! operations. The surface is kept small enough for exhaustive matching
//! in the HTTP layer: not-found and validation get dedicated variants,
//! everything else is an internal failure.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error (includes foreign-key violations).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Schema migration failed.
    #[error("migration error: {message}")]
    Migration {
        /// Describes which migration failed and why.
        message: String,
    },

    /// Requested event was not found under the caller's ownership.
    ///
    /// Also returned for events owned by a different user — ownership is
    /// never disclosed through errors.
    #[error("event not found: {0}")]
    EventNotFound(String),

    /// Requested user was not found.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// A submitted object entry failed validation.
    ///
    /// Raised before any mutation is applied, so a batch containing one
    /// invalid entry leaves the persisted set untouched.
    #[error("validation error on {field}: {message}")]
    Validation {
        /// Path of the offending field, e.g. `objects[2].velocityLab`.
        field: String,
        /// Human-readable description of the violation.
        message: String,
    },
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

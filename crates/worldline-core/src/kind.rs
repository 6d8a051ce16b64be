//! The enumerated kind of a simulation object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kind of a simulation object within an event.
///
/// Serialized in lowercase on the wire and in the database
/// (`"box"` / `"clock"` / `"flash"`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A rigid box (length-contraction demos).
    #[default]
    Box,
    /// A clock (time-dilation demos).
    Clock,
    /// A light flash (simultaneity demos).
    Flash,
}

impl ObjectKind {
    /// Lowercase string form, matching the wire and database representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Clock => "clock",
            Self::Flash => "flash",
        }
    }

    /// All kinds, in declaration order.
    #[must_use]
    pub fn all() -> [Self; 3] {
        [Self::Box, Self::Clock, Self::Flash]
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown object kind.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown object kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for ObjectKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "box" => Ok(Self::Box),
            "clock" => Ok(Self::Clock),
            "flash" => Ok(Self::Flash),
            other => Err(UnknownKind(other.to_owned())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

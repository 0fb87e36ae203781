//! crates/reviewer_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs carry serde derives because the boot payload crosses the
//! server/client boundary as JSON, but they know nothing about storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chess puzzle produced by the offline generator.
///
/// Everything beyond `id` is opaque to this tool: the position and solution
/// are displayed and forwarded, never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    pub id: i64,
    /// Board position in FEN notation.
    pub fen: String,
    /// Solution line as UCI move strings.
    pub solution: Vec<String>,
    /// Identifier of the game the puzzle was extracted from, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
}

/// A scored judgment of a puzzle by an authenticated reviewer.
///
/// Appended exactly once per submission; never updated or deleted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Resolved reviewer username. Must be non-empty before the store sees it.
    pub by: String,
    pub at: DateTime<Utc>,
    pub score: i32,
    pub comment: String,
    pub rating: i32,
}

/// The review fields a client submits; the server fills in `by` and `at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSubmission {
    pub score: i32,
    pub comment: String,
    pub rating: i32,
}

/// The per-request identity context: an opaque authId, if any.
///
/// An absent or empty authId means "unauthenticated". The field is only ever
/// resolved to a username through the auth port.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub auth_id: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { auth_id: None }
    }

    pub fn with_auth_id(auth_id: impl Into<String>) -> Self {
        let auth_id = auth_id.into();
        Self {
            auth_id: if auth_id.is_empty() { None } else { Some(auth_id) },
        }
    }
}

/// The full payload the server hands the client: at page boot, and again in
/// the response to every accepted review. The server is authoritative; the
/// client replaces its state with this wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootData {
    pub username: String,
    pub puzzle: Puzzle,
}

//! crates/reviewer_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! core independent of the concrete store and OAuth provider.

use async_trait::async_trait;

use crate::domain::{BootData, Puzzle, Review, ReviewSubmission};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// "Not found" is never an error at this layer: ports return `Ok(None)` for
/// soft absence and reserve `PortError` for genuine failures.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The OAuth exchange failed. The message is for server-side logs only
    /// and must never be returned to a client.
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("an unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The OAuth/session boundary.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolves an opaque authId to a username.
    ///
    /// Returns `Ok(None)` when the authId is empty or unknown; never errors
    /// for "not found".
    async fn resolve_username(&self, auth_id: &str) -> PortResult<Option<String>>;

    /// The provider-defined authorization URL to redirect a browser to.
    fn begin_auth(&self) -> String;

    /// Exchanges an authorization code for a token, resolves the external
    /// identity, persists the pair, and returns a new opaque authId.
    ///
    /// Fails with [`PortError::Authentication`] when the code is invalid or
    /// the provider call fails; no session is created on failure.
    async fn complete_auth(&self, code: &str) -> PortResult<String>;

    /// Clears the session behind `auth_id`. Idempotent.
    async fn logout(&self, auth_id: &str) -> PortResult<()>;
}

/// The puzzle persistence boundary.
#[async_trait]
pub trait PuzzleStore: Send + Sync {
    /// Fetches a puzzle by id, `Ok(None)` when absent. Callers validate the
    /// id shape before this point.
    async fn get_by_id(&self, id: i64) -> PortResult<Option<Puzzle>>;

    /// The next puzzle needing review, `Ok(None)` only when the backlog is
    /// empty. The selection policy belongs to the store; callers may only
    /// assume the backlog is eventually exhausted.
    async fn next(&self) -> PortResult<Option<Puzzle>>;

    /// Appends one review to a puzzle. Fields are validated by the caller.
    /// Persistence failures propagate; a review is never silently dropped.
    async fn append_review(&self, puzzle_id: i64, review: &Review) -> PortResult<()>;
}

/// The client controller's outbound port: submits a review and receives the
/// authoritative replacement state.
#[async_trait]
pub trait ReviewGateway: Send + Sync {
    async fn submit(&self, puzzle_id: i64, submission: &ReviewSubmission) -> PortResult<BootData>;
}

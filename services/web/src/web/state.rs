//! services/web/src/web/state.rs
//!
//! The shared application state, created once at startup and passed to all
//! handlers. Ports are held as trait objects so tests can swap in in-memory
//! implementations.

use std::sync::Arc;

use reviewer_core::ports::{AuthService, PuzzleStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PuzzleStore>,
    pub auth: Arc<dyn AuthService>,
}

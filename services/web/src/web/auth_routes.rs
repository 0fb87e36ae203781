//! services/web/src/web/auth_routes.rs
//!
//! The OAuth handshake endpoints and logout. Provider failure detail is
//! logged server-side only; clients see a generic message.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::error;

use crate::web::session::{clear_session_cookie, session_from_headers, set_session_cookie};
use crate::web::state::AppState;

/// GET /auth - send the browser to the provider's authorization page.
pub async fn begin_auth(State(state): State<Arc<AppState>>) -> Redirect {
    Redirect::to(&state.auth.begin_auth())
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    code: String,
}

/// GET /oauth-callback - complete the code exchange and establish a session.
pub async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    match state.auth.complete_auth(&query.code).await {
        Ok(auth_id) => (
            [(header::SET_COOKIE, set_session_cookie(&auth_id))],
            Redirect::to("/"),
        )
            .into_response(),
        Err(e) => {
            // Never echo provider detail (or the code) back to the browser.
            error!("OAuth exchange failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed").into_response()
        }
    }
}

/// GET /logout - clear the session and return to the login prompt. Safe to
/// repeat: a second logout finds no session and still redirects.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, (StatusCode, String)> {
    if let Some(auth_id) = session_from_headers(&headers).auth_id {
        state.auth.logout(&auth_id).await.map_err(|e| {
            error!("Failed to clear session: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        })?;
    }

    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/"),
    )
        .into_response())
}

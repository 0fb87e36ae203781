//! services/web/src/web/session.rs
//!
//! Cookie plumbing for the opaque authId. The cookie value is the authId
//! itself; an absent or empty cookie means "unauthenticated".

use axum::http::{header, HeaderMap};
use reviewer_core::domain::Session;

const COOKIE_NAME: &str = "session";

/// Extracts the request's session from the Cookie header.
pub fn session_from_headers(headers: &HeaderMap) -> Session {
    let Some(cookie_header) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) else {
        return Session::anonymous();
    };

    cookie_header
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .map(Session::with_auth_id)
        .unwrap_or_else(Session::anonymous)
}

/// The Set-Cookie value establishing a session.
pub fn set_session_cookie(auth_id: &str) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/",
        COOKIE_NAME, auth_id
    )
}

/// The Set-Cookie value clearing a session.
pub fn clear_session_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", COOKIE_NAME)
}

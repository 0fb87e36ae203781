//! services/web/src/web/pages.rs
//!
//! The puzzle pages. Both routes funnel through one rendering decision:
//! no puzzle -> 404, no authenticated username -> login prompt, otherwise
//! the interactive page with the boot payload embedded for the client.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Html,
};
use reviewer_core::controller::ControllerState;
use reviewer_core::domain::{BootData, Puzzle};
use reviewer_core::view;
use tracing::error;

use crate::web::session::session_from_headers;
use crate::web::state::AppState;

type PageResult = Result<Html<String>, (StatusCode, String)>;

/// GET / - the next puzzle needing review.
pub async fn index_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> PageResult {
    let puzzle = state.store.next().await.map_err(|e| {
        error!("Failed to fetch next puzzle: {e}");
        internal()
    })?;
    render_page(&state, &headers, puzzle).await
}

/// GET /puzzle/{id} - one specific puzzle.
pub async fn puzzle_page(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> PageResult {
    if id < 0 {
        return Err(not_found());
    }
    let puzzle = state.store.get_by_id(id).await.map_err(|e| {
        error!("Failed to fetch puzzle {id}: {e}");
        internal()
    })?;
    render_page(&state, &headers, puzzle).await
}

/// The single rendering funnel shared by every puzzle page.
async fn render_page(
    state: &AppState,
    headers: &HeaderMap,
    puzzle: Option<Puzzle>,
) -> PageResult {
    let Some(puzzle) = puzzle else {
        return Err(not_found());
    };

    let session = session_from_headers(headers);
    let username = match &session.auth_id {
        Some(auth_id) => state.auth.resolve_username(auth_id).await.map_err(|e| {
            error!("Failed to resolve session username: {e}");
            internal()
        })?,
        None => None,
    };

    match username {
        None => {
            let tree = view::render(&ControllerState::logged_out());
            Ok(Html(page_shell(&view::to_html(&tree), None)))
        }
        Some(username) => {
            let boot = BootData { username, puzzle };
            let tree = view::render(&ControllerState::from_boot(boot.clone()));
            let payload = serde_json::to_string(&boot).map_err(|e| {
                error!("Failed to serialize boot payload: {e}");
                internal()
            })?;
            Ok(Html(page_shell(&view::to_html(&tree), Some(&payload))))
        }
    }
}

/// Wraps rendered view HTML in the document shell, embedding the boot
/// payload as a JSON literal when the page is interactive.
fn page_shell(body: &str, boot_json: Option<&str>) -> String {
    let mut page = String::from(
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Puzzle review</title>\n\
         <style>body{font-family:sans-serif;max-width:40rem;margin:2rem auto}\
         .error{color:#b00}.hints{color:#777;font-size:.8rem}</style>\n</head>\n<body>\n",
    );
    page.push_str("<div id=\"app\">");
    page.push_str(body);
    page.push_str("</div>\n");
    if let Some(json) = boot_json {
        // "</" would close the script element early.
        let safe = json.replace("</", "<\\/");
        page.push_str("<script id=\"boot\" type=\"application/json\">");
        page.push_str(&safe);
        page.push_str("</script>\n<script src=\"/assets/app.js\"></script>\n");
    }
    page.push_str("</body>\n</html>\n");
    page
}

fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "puzzle not found".to_string())
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

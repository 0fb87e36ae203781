//! services/web/src/web/review.rs
//!
//! POST /review/{id}: the review/advance workflow. The order is fixed:
//! puzzle lookup (404), username resolution (403), input validation (400),
//! review append, next-puzzle fetch (404 when exhausted), JSON response.
//! A review is never appended for a missing puzzle or an unauthenticated
//! caller, and a successful append hands back the next puzzle in the same
//! response.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use chrono::Utc;
use reviewer_core::domain::{BootData, Review};
use serde::Deserialize;
use tracing::error;

use crate::web::session::session_from_headers;
use crate::web::state::AppState;

/// Raw query parameters. `score` and `rating` arrive as strings and are
/// parsed strictly; a malformed integer is rejected, never coerced.
#[derive(Deserialize)]
pub struct ReviewQuery {
    score: String,
    #[serde(default)]
    comment: String,
    rating: String,
}

pub async fn review_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<BootData>, (StatusCode, String)> {
    // 1. The puzzle must exist.
    if id < 0 {
        return Err(not_found("puzzle not found"));
    }
    let puzzle = state
        .store
        .get_by_id(id)
        .await
        .map_err(|e| {
            error!("Failed to fetch puzzle {id}: {e}");
            internal()
        })?
        .ok_or_else(|| not_found("puzzle not found"))?;

    // 2. The caller must resolve to a username.
    let session = session_from_headers(&headers);
    let username = match &session.auth_id {
        Some(auth_id) => state.auth.resolve_username(auth_id).await.map_err(|e| {
            error!("Failed to resolve session username: {e}");
            internal()
        })?,
        None => None,
    };
    let Some(username) = username else {
        return Err((
            StatusCode::FORBIDDEN,
            "authentication required".to_string(),
        ));
    };

    // 3. The input must be well-formed.
    let score = parse_int("score", &query.score)?;
    let rating = parse_int("rating", &query.rating)?;

    // 4. Append the review.
    let review = Review {
        by: username.clone(),
        at: Utc::now(),
        score,
        comment: query.comment,
        rating,
    };
    state.store.append_review(puzzle.id, &review).await.map_err(|e| {
        error!("Failed to append review for puzzle {id}: {e}");
        internal()
    })?;

    // 5. Hand back the next puzzle, or 404 when the backlog is exhausted.
    let next = state
        .store
        .next()
        .await
        .map_err(|e| {
            error!("Failed to fetch next puzzle: {e}");
            internal()
        })?
        .ok_or_else(|| not_found("no puzzles left to review"))?;

    Ok(Json(BootData {
        username,
        puzzle: next,
    }))
}

fn parse_int(name: &str, raw: &str) -> Result<i32, (StatusCode, String)> {
    raw.trim().parse::<i32>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            format!("{name} must be an integer"),
        )
    })
}

fn not_found(message: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, message.to_string())
}

fn internal() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

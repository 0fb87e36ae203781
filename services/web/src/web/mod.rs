pub mod auth_routes;
pub mod pages;
pub mod review;
pub mod session;
pub mod state;

use std::sync::Arc;

use axum::{
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Builds the application router. Hoisted out of the binary so tests can
/// drive it in-process against mock ports.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::index_page))
        .route("/puzzle/{id}", get(pages::puzzle_page))
        .route("/review/{id}", post(review::review_handler))
        .route("/auth", get(auth_routes::begin_auth))
        .route("/oauth-callback", get(auth_routes::oauth_callback))
        .route("/logout", get(auth_routes::logout))
        .route("/assets/app.js", get(app_js))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn app_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        include_str!("../../assets/app.js"),
    )
}

//! In-process router tests against in-memory implementations of the ports.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use reviewer_core::domain::{BootData, Puzzle, Review};
use reviewer_core::ports::{AuthService, PortError, PortResult, PuzzleStore};
use web_lib::web::{app, state::AppState};

//=========================================================================================
// Mock Ports
//=========================================================================================

#[derive(Default)]
struct MockStore {
    puzzles: Mutex<Vec<Puzzle>>,
    reviews: Mutex<Vec<(i64, Review)>>,
    /// Models the backlog emptying between the append and the next() call
    /// (the store owns the policy; callers may not assume otherwise).
    exhaust_after_review: bool,
}

impl MockStore {
    fn make(ids: &[i64]) -> Self {
        let puzzles = ids
            .iter()
            .map(|&id| Puzzle {
                id,
                fen: format!("fen-{id}"),
                solution: vec!["e2e4".into(), "e7e5".into()],
                game_id: None,
            })
            .collect();
        Self {
            puzzles: Mutex::new(puzzles),
            ..Self::default()
        }
    }

    fn with_puzzles(ids: &[i64]) -> Arc<Self> {
        Arc::new(Self::make(ids))
    }

    fn exhausting(ids: &[i64]) -> Arc<Self> {
        Arc::new(Self {
            exhaust_after_review: true,
            ..Self::make(ids)
        })
    }

    fn review_count(&self) -> usize {
        self.reviews.lock().unwrap().len()
    }
}

#[async_trait]
impl PuzzleStore for MockStore {
    async fn get_by_id(&self, id: i64) -> PortResult<Option<Puzzle>> {
        Ok(self
            .puzzles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn next(&self) -> PortResult<Option<Puzzle>> {
        // Same policy as the real adapter: fewest reviews, ties by lowest id.
        let reviews = self.reviews.lock().unwrap();
        if self.exhaust_after_review && !reviews.is_empty() {
            return Ok(None);
        }
        let puzzles = self.puzzles.lock().unwrap();
        let count = |id: i64| reviews.iter().filter(|(pid, _)| *pid == id).count();
        let mut best: Option<&Puzzle> = None;
        for p in puzzles.iter() {
            best = match best {
                Some(b) if (count(b.id), b.id) <= (count(p.id), p.id) => Some(b),
                _ => Some(p),
            };
        }
        Ok(best.cloned())
    }

    async fn append_review(&self, puzzle_id: i64, review: &Review) -> PortResult<()> {
        self.reviews
            .lock()
            .unwrap()
            .push((puzzle_id, review.clone()));
        Ok(())
    }
}

struct MockAuth {
    sessions: Mutex<HashMap<String, String>>,
}

impl MockAuth {
    fn with_session(auth_id: &str, username: &str) -> Arc<Self> {
        let mut sessions = HashMap::new();
        sessions.insert(auth_id.to_string(), username.to_string());
        Arc::new(Self {
            sessions: Mutex::new(sessions),
        })
    }

    fn empty() -> Arc<Self> {
        Arc::new(Self {
            sessions: Mutex::new(HashMap::new()),
        })
    }
}

#[async_trait]
impl AuthService for MockAuth {
    async fn resolve_username(&self, auth_id: &str) -> PortResult<Option<String>> {
        Ok(self.sessions.lock().unwrap().get(auth_id).cloned())
    }

    fn begin_auth(&self) -> String {
        "https://provider.example/authorize?client_id=reviewer".to_string()
    }

    async fn complete_auth(&self, code: &str) -> PortResult<String> {
        if code == "good-code" {
            self.sessions
                .lock()
                .unwrap()
                .insert("fresh-session".to_string(), "bob".to_string());
            Ok("fresh-session".to_string())
        } else {
            Err(PortError::Authentication("provider rejected code".into()))
        }
    }

    async fn logout(&self, auth_id: &str) -> PortResult<()> {
        self.sessions.lock().unwrap().remove(auth_id);
        Ok(())
    }
}

//=========================================================================================
// Harness
//=========================================================================================

fn router(store: Arc<MockStore>, auth: Arc<MockAuth>) -> axum::Router {
    app(Arc::new(AppState { store, auth }))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

//=========================================================================================
// Tests
//=========================================================================================

#[tokio::test]
async fn unknown_puzzle_is_404_for_page_and_review() {
    let store = MockStore::with_puzzles(&[1]);
    let auth = MockAuth::with_session("tok", "alice");

    let res = router(store.clone(), auth.clone())
        .oneshot(get("/puzzle/99", Some("session=tok")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = router(store.clone(), auth)
        .oneshot(post("/review/99?score=5&comment=ok&rating=1500", Some("session=tok")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.review_count(), 0);
}

#[tokio::test]
async fn unauthenticated_pages_render_the_login_prompt() {
    let store = MockStore::with_puzzles(&[1]);
    let auth = MockAuth::empty();

    for uri in ["/", "/puzzle/1"] {
        // No cookie at all, and a cookie the store has never seen, behave
        // the same way.
        for cookie in [None, Some("session=stale")] {
            let res = router(store.clone(), auth.clone())
                .oneshot(get(uri, cookie))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::OK);
            let body = body_string(res).await;
            assert!(body.contains("login-prompt"), "{uri} should prompt login");
            assert!(!body.contains("data-fen"), "{uri} must not leak the puzzle");
        }
    }
}

#[tokio::test]
async fn unauthenticated_review_is_403_and_appends_nothing() {
    let store = MockStore::with_puzzles(&[1]);
    let res = router(store.clone(), MockAuth::empty())
        .oneshot(post("/review/1?score=5&comment=ok&rating=1500", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.review_count(), 0);
}

#[tokio::test]
async fn authenticated_page_embeds_the_boot_payload() {
    let store = MockStore::with_puzzles(&[1]);
    let auth = MockAuth::with_session("tok", "alice");

    let res = router(store, auth)
        .oneshot(get("/puzzle/1", Some("session=tok")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_string(res).await;
    assert!(body.contains("data-fen=\"fen-1\""));
    assert!(body.contains("id=\"boot\""));
    assert!(body.contains("\"username\":\"alice\""));
    assert!(body.contains("reviewing as alice"));
}

#[tokio::test]
async fn successful_review_appends_once_and_returns_the_next_puzzle() {
    let store = MockStore::with_puzzles(&[1, 2]);
    let auth = MockAuth::with_session("tok", "alice");

    let res = router(store.clone(), auth)
        .oneshot(post("/review/1?score=5&comment=ok&rating=1500", Some("session=tok")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let boot: BootData = serde_json::from_str(&body_string(res).await).unwrap();
    assert_eq!(boot.username, "alice");
    assert_eq!(boot.puzzle.id, 2, "the response carries the next puzzle");

    let reviews = store.reviews.lock().unwrap();
    assert_eq!(reviews.len(), 1);
    let (puzzle_id, review) = &reviews[0];
    assert_eq!(*puzzle_id, 1);
    assert_eq!(review.by, "alice");
    assert_eq!(review.score, 5);
    assert_eq!(review.comment, "ok");
    assert_eq!(review.rating, 1500);
    assert!(review.at <= Utc::now());
}

#[tokio::test]
async fn malformed_integers_are_rejected_not_coerced() {
    let store = MockStore::with_puzzles(&[1]);
    let auth = MockAuth::with_session("tok", "alice");

    for uri in [
        "/review/1?score=five&comment=ok&rating=1500",
        "/review/1?score=5&comment=ok&rating=strong",
    ] {
        let res = router(store.clone(), auth.clone())
            .oneshot(post(uri, Some("session=tok")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
    assert_eq!(store.review_count(), 0);
}

#[tokio::test]
async fn exhausted_backlog_returns_404_but_the_review_is_kept() {
    let store = MockStore::exhausting(&[7]);
    let auth = MockAuth::with_session("tok", "alice");

    let res = router(store.clone(), auth)
        .oneshot(post("/review/7?score=1&comment=&rating=1500", Some("session=tok")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.review_count(), 1, "the append is not rolled back");
}

#[tokio::test]
async fn logout_clears_the_session_idempotently() {
    let store = MockStore::with_puzzles(&[1]);
    let auth = MockAuth::with_session("tok", "alice");
    let app = router(store, auth);

    let res = app
        .clone()
        .oneshot(get("/logout", Some("session=tok")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.contains("Max-Age=0"));

    // The old cookie no longer resolves.
    let res = app
        .clone()
        .oneshot(get("/", Some("session=tok")))
        .await
        .unwrap();
    assert!(body_string(res).await.contains("login-prompt"));

    // Logging out twice causes no error.
    let res = app
        .oneshot(get("/logout", Some("session=tok")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn auth_redirects_to_the_provider() {
    let res = router(MockStore::with_puzzles(&[1]), MockAuth::empty())
        .oneshot(get("/auth", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let location = res.headers().get(header::LOCATION).unwrap().to_str().unwrap();
    assert!(location.starts_with("https://provider.example/authorize"));
}

#[tokio::test]
async fn oauth_callback_success_sets_the_cookie_and_redirects_home() {
    let store = MockStore::with_puzzles(&[1]);
    let auth = MockAuth::empty();
    let app = router(store, auth);

    let res = app
        .clone()
        .oneshot(get("/oauth-callback?code=good-code", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session=fresh-session"));
    assert!(cookie.contains("HttpOnly"));

    // The new session works end to end.
    let res = app
        .oneshot(get("/", Some("session=fresh-session")))
        .await
        .unwrap();
    assert!(body_string(res).await.contains("reviewing as bob"));
}

#[tokio::test]
async fn oauth_callback_failure_is_a_generic_500_without_a_session() {
    let res = router(MockStore::with_puzzles(&[1]), MockAuth::empty())
        .oneshot(get("/oauth-callback?code=bad-code", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.headers().get(header::SET_COOKIE).is_none());
    let body = body_string(res).await;
    assert_eq!(body, "Authentication failed");
    assert!(!body.contains("bad-code"), "no code detail leaks to the client");
}

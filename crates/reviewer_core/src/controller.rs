//! crates/reviewer_core/src/controller.rs
//!
//! The client-side view controller: a plain reducer over an explicit state
//! struct, plus an async driver that talks to the review gateway. All state
//! lives here; the view renderer is a pure function of it.

use crate::domain::{BootData, Puzzle, ReviewSubmission};
use crate::ports::ReviewGateway;
use crate::view::{self, Node};

/// Rating submitted when the reviewer never touched the rating field.
const FALLBACK_RATING: i32 = 1500;

//=========================================================================================
// State
//=========================================================================================

/// Review fields accumulated from keyboard input but not yet submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewInput {
    pub score: Option<i32>,
    pub comment: String,
    pub rating: Option<i32>,
}

impl ReviewInput {
    fn to_submission(&self, accept: bool) -> ReviewSubmission {
        let magnitude = self.score.map(i32::abs).unwrap_or(1);
        ReviewSubmission {
            score: if accept { magnitude } else { -magnitude },
            comment: self.comment.clone(),
            rating: self.rating.unwrap_or(FALLBACK_RATING),
        }
    }
}

/// The whole of the client's state.
///
/// `history` holds puzzles already reviewed this session, oldest first, for
/// local back/forward navigation only. `cursor` indexes the virtual list
/// `history + [current]`; `cursor == history.len()` means the live puzzle is
/// displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    pub username: String,
    pub current: Option<Puzzle>,
    pub history: Vec<Puzzle>,
    pub cursor: usize,
    pub input: ReviewInput,
    pub in_flight: bool,
    pub error: Option<String>,
}

impl ControllerState {
    /// State for a page with no authenticated reviewer.
    pub fn logged_out() -> Self {
        Self {
            username: String::new(),
            current: None,
            history: Vec::new(),
            cursor: 0,
            input: ReviewInput::default(),
            in_flight: false,
            error: None,
        }
    }

    /// State rebuilt from a server boot payload.
    pub fn from_boot(data: BootData) -> Self {
        Self {
            username: data.username,
            current: Some(data.puzzle),
            ..Self::logged_out()
        }
    }

    /// The puzzle under the navigation cursor, if any.
    pub fn displayed(&self) -> Option<&Puzzle> {
        if self.cursor < self.history.len() {
            self.history.get(self.cursor)
        } else {
            self.current.as_ref()
        }
    }

    /// Whether the live (reviewable) puzzle is the one on display.
    pub fn at_live(&self) -> bool {
        self.cursor == self.history.len()
    }
}

//=========================================================================================
// Reducer
//=========================================================================================

/// Everything that can change the controller state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetScore(i32),
    SetRating(i32),
    SetComment(String),
    Back,
    Forward,
    SubmitStarted,
    SubmitSucceeded(BootData),
    SubmitFailed(String),
}

/// The single reducer: `(state, action) -> state`. No mutation happens
/// anywhere else.
pub fn apply(mut state: ControllerState, action: Action) -> ControllerState {
    match action {
        Action::SetScore(score) => state.input.score = Some(score),
        Action::SetRating(rating) => state.input.rating = Some(rating),
        Action::SetComment(comment) => state.input.comment = comment,
        Action::Back => {
            if state.cursor > 0 {
                state.cursor -= 1;
            }
        }
        Action::Forward => {
            if state.cursor < state.history.len() {
                state.cursor += 1;
            }
        }
        Action::SubmitStarted => {
            state.in_flight = true;
            state.error = None;
        }
        Action::SubmitSucceeded(data) => {
            // Replace-on-success: the server's payload is the whole truth.
            // The reviewed puzzle is kept only for local navigation.
            if let Some(done) = state.current.take() {
                state.history.push(done);
            }
            state.username = data.username;
            state.current = Some(data.puzzle);
            state.cursor = state.history.len();
            state.input = ReviewInput::default();
            state.in_flight = false;
            state.error = None;
        }
        Action::SubmitFailed(message) => {
            // Puzzle, username and the in-progress input stay untouched.
            state.in_flight = false;
            state.error = Some(message);
        }
    }
    state
}

//=========================================================================================
// Keyboard map
//=========================================================================================

/// What a key press should do: edit local state, or kick off a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyCommand {
    Edit(Action),
    Submit(bool),
}

/// Maps a key name (DOM `KeyboardEvent.key` convention) to a command.
pub fn key_action(key: &str) -> Option<KeyCommand> {
    match key {
        "ArrowLeft" => Some(KeyCommand::Edit(Action::Back)),
        "ArrowRight" => Some(KeyCommand::Edit(Action::Forward)),
        "a" | "Enter" => Some(KeyCommand::Submit(true)),
        "x" => Some(KeyCommand::Submit(false)),
        d if d.len() == 1 && d.chars().all(|c| c.is_ascii_digit()) && d != "0" => {
            // Single digit sets the score magnitude.
            Some(KeyCommand::Edit(Action::SetScore(d.parse().ok()?)))
        }
        _ => None,
    }
}

//=========================================================================================
// Driver
//=========================================================================================

/// Owns the state and the gateway, and caches the rendered tree.
///
/// Strictly single-threaded and cooperative: every mutation goes through
/// [`Controller::dispatch`], which redraws synchronously before returning, so
/// the cached tree never lags the state.
pub struct Controller<G> {
    state: ControllerState,
    gateway: G,
    tree: Node,
}

impl<G: ReviewGateway> Controller<G> {
    /// Boots the controller from the payload embedded in the page.
    pub fn boot(data: BootData, gateway: G) -> Self {
        let state = ControllerState::from_boot(data);
        let tree = view::render(&state);
        Self { state, gateway, tree }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// The most recent render. Always consistent with [`Controller::state`].
    pub fn tree(&self) -> &Node {
        &self.tree
    }

    /// Applies one action and redraws.
    pub fn dispatch(&mut self, action: Action) {
        let state = std::mem::replace(&mut self.state, ControllerState::logged_out());
        self.state = apply(state, action);
        self.tree = view::render(&self.state);
    }

    /// Submits the accumulated input for the live puzzle.
    ///
    /// Non-reentrant: a call while a submission is in flight is ignored, as
    /// is a call while browsing history or with no puzzle on display. On
    /// failure the displayed puzzle, username and input are left unchanged
    /// and the error is surfaced through the view.
    pub async fn review(&mut self, accept: bool) {
        if self.state.in_flight || !self.state.at_live() {
            return;
        }
        let Some(puzzle_id) = self.state.current.as_ref().map(|p| p.id) else {
            return;
        };
        let submission = self.state.input.to_submission(accept);
        self.dispatch(Action::SubmitStarted);
        match self.gateway.submit(puzzle_id, &submission).await {
            Ok(data) => self.dispatch(Action::SubmitSucceeded(data)),
            Err(err) => self.dispatch(Action::SubmitFailed(err.to_string())),
        }
    }

    /// Routes a key press. Edits are applied immediately; submissions run
    /// through [`Controller::review`].
    pub async fn handle_key(&mut self, key: &str) {
        match key_action(key) {
            Some(KeyCommand::Edit(action)) => self.dispatch(action),
            Some(KeyCommand::Submit(accept)) => self.review(accept).await,
            None => {}
        }
    }
}

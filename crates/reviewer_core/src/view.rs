//! crates/reviewer_core/src/view.rs
//!
//! The pure view layer: `render` maps a controller state to a display tree,
//! and `to_html` prints a tree. No side effects, no internal state; the same
//! state always produces the same tree. The server uses the same renderer
//! for the initial page, so both sides draw from one source.

use serde::Serialize;

use crate::controller::ControllerState;
use crate::domain::Puzzle;

/// A minimal display tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Text {
        value: String,
    },
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<Node>,
    },
}

fn text(value: impl Into<String>) -> Node {
    Node::Text { value: value.into() }
}

fn el(tag: &str, attrs: &[(&str, &str)], children: Vec<Node>) -> Node {
    Node::Element {
        tag: tag.to_string(),
        attrs: attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        children,
    }
}

//=========================================================================================
// Rendering
//=========================================================================================

/// Maps controller state to a display tree.
///
/// Three top-level shapes: a login prompt when there is no authenticated
/// username, a terminal card when the backlog is exhausted, and the puzzle
/// UI otherwise.
pub fn render(state: &ControllerState) -> Node {
    if state.username.is_empty() {
        return login_prompt();
    }
    match state.displayed() {
        None => backlog_clear(&state.username),
        Some(puzzle) => puzzle_card(state, puzzle),
    }
}

fn login_prompt() -> Node {
    el(
        "div",
        &[("class", "login-prompt")],
        vec![
            el("h1", &[], vec![text("Puzzle review")]),
            el("p", &[], vec![text("You need to sign in to review puzzles.")]),
            el("a", &[("class", "button"), ("href", "/auth")], vec![text("Sign in")]),
        ],
    )
}

fn backlog_clear(username: &str) -> Node {
    el(
        "div",
        &[("class", "done")],
        vec![
            el("h1", &[], vec![text("All caught up")]),
            el(
                "p",
                &[],
                vec![text(format!("No puzzles left to review, {username}."))],
            ),
        ],
    )
}

fn puzzle_card(state: &ControllerState, puzzle: &Puzzle) -> Node {
    let mut children = vec![
        el(
            "header",
            &[],
            vec![
                el("h1", &[], vec![text(format!("Puzzle #{}", puzzle.id))]),
                el(
                    "span",
                    &[("class", "reviewer")],
                    vec![text(format!("reviewing as {}", state.username))],
                ),
            ],
        ),
        el("div", &[("class", "board"), ("data-fen", &puzzle.fen)], vec![]),
        solution_line(puzzle),
        input_summary(state),
    ];

    if let Some(game_id) = &puzzle.game_id {
        children.push(el(
            "p",
            &[("class", "source")],
            vec![text(format!("from game {game_id}"))],
        ));
    }
    if !state.at_live() {
        children.push(el(
            "p",
            &[("class", "history-note")],
            vec![text("already reviewed (read-only)")],
        ));
    }
    if state.in_flight {
        children.push(el("p", &[("class", "saving")], vec![text("saving…")]));
    }
    if let Some(error) = &state.error {
        children.push(el(
            "p",
            &[("class", "error")],
            vec![text(format!("review not saved: {error}"))],
        ));
    }
    children.push(el(
        "footer",
        &[("class", "hints")],
        vec![text("1-9 score · a/Enter accept · x reject · ←/→ browse")],
    ));

    el("div", &[("class", "puzzle")], children)
}

fn solution_line(puzzle: &Puzzle) -> Node {
    let moves = puzzle
        .solution
        .iter()
        .map(|m| el("li", &[], vec![text(m.clone())]))
        .collect();
    el("ol", &[("class", "solution")], moves)
}

fn input_summary(state: &ControllerState) -> Node {
    let score = state
        .input
        .score
        .map(|s| s.to_string())
        .unwrap_or_else(|| "–".to_string());
    let rating = state
        .input
        .rating
        .map(|r| r.to_string())
        .unwrap_or_else(|| "–".to_string());
    el(
        "dl",
        &[("class", "input")],
        vec![
            el("dt", &[], vec![text("score")]),
            el("dd", &[("id", "score")], vec![text(score)]),
            el("dt", &[], vec![text("rating")]),
            el("dd", &[("id", "rating")], vec![text(rating)]),
            el("dt", &[], vec![text("comment")]),
            el("dd", &[("id", "comment")], vec![text(state.input.comment.clone())]),
        ],
    )
}

//=========================================================================================
// HTML printing
//=========================================================================================

/// Prints a display tree as HTML, escaping all text and attribute values.
pub fn to_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text { value } => out.push_str(&escape(value)),
        Node::Element { tag, attrs, children } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape(value));
                out.push('"');
            }
            out.push('>');
            for child in children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

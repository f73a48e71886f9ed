//! Snapshot of everything a front end needs to draw.

use crate::games::chess::{GameStatus, Side, Square};
use serde::Serialize;

/// A transient message shown above the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Banner {
    /// The oracle is thinking.
    Analyzing,
    /// A dismissible error from the last action.
    Notice(String),
    /// The game has ended.
    GameOver(GameStatus),
    /// The side to move is in check.
    Check(Side),
}

impl std::fmt::Display for Banner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Banner::Analyzing => write!(f, "Analyzing..."),
            Banner::Notice(message) => write!(f, "{}", message),
            Banner::GameOver(status) => write!(f, "Game over: {}", status),
            Banner::Check(side) => write!(f, "{} is in check", side.label()),
        }
    }
}

/// One row of the move table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_new::new)]
pub struct MovePair {
    /// Full-move number, starting at 1.
    pub number: usize,
    /// White's move.
    pub first: String,
    /// Black's reply, if played.
    pub second: Option<String>,
}

/// Groups a move log into numbered pairs.
pub fn move_pairs(move_log: &[String]) -> Vec<MovePair> {
    move_log
        .chunks(2)
        .enumerate()
        .map(|(i, chunk)| {
            MovePair::new(
                i + 1,
                chunk.first().cloned().unwrap_or_default(),
                chunk.get(1).cloned(),
            )
        })
        .collect()
}

/// Rendered surface of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView<P> {
    /// Position at the cursor.
    pub position: P,
    /// Whether the displayed position is the live one.
    pub live: bool,
    /// Cursor into history.
    pub cursor: usize,
    /// Index of the live position.
    pub last_index: usize,
    /// Oracle's side, `None` before the first game.
    pub oracle_side: Option<Side>,
    /// Side to move in the live position.
    pub turn: Side,
    /// Status of the live position.
    pub status: GameStatus,
    /// Side shown at the bottom of the board.
    pub orientation: Side,
    /// Selected origin.
    pub selected: Option<Square>,
    /// Selected origin and its destinations.
    pub highlighted: Vec<Square>,
    /// Messages to show, most important first.
    pub banners: Vec<Banner>,
    /// Move table.
    pub move_pairs: Vec<MovePair>,
}

impl<P> SessionView<P> {
    /// Navigation counter, e.g. `3/7`.
    pub fn counter(&self) -> String {
        format!("{}/{}", self.cursor, self.last_index)
    }

    /// Whether the oracle is thinking.
    pub fn is_analyzing(&self) -> bool {
        self.banners.contains(&Banner::Analyzing)
    }

    /// Current notice, if any.
    pub fn notice(&self) -> Option<&str> {
        self.banners.iter().find_map(|b| match b {
            Banner::Notice(message) => Some(message.as_str()),
            _ => None,
        })
    }
}

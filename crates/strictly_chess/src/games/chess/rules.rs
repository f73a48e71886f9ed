//! The rules-engine seam.
//!
//! The session never interprets a position itself. Everything it needs to
//! know about legality, termination and notation goes through this trait,
//! so the state machine can be exercised with any engine that honours it.

use super::types::{GameStatus, Move, Piece, Side, Square};
use derive_more::{Display, Error};
use std::fmt::Debug;

/// A move the engine refused to apply.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("Illegal move {}", attempted)]
pub struct IllegalMove {
    /// The rejected move.
    pub attempted: Move,
}

/// Legality, application and termination for one game.
///
/// Positions are immutable snapshots: `apply` returns a new one and never
/// touches its input.
pub trait RulesEngine: Send + Sync {
    /// Full board state sufficient to resume play.
    type Position: Clone + Debug + PartialEq + Send + Sync + 'static;

    /// The starting position of a new game.
    fn initial_position(&self) -> Self::Position;

    /// Legal moves in `position`, optionally restricted to one origin.
    fn legal_moves(&self, position: &Self::Position, origin: Option<Square>) -> Vec<Move>;

    /// Applies `mv`, returning the resulting position and the move's notation.
    fn apply(
        &self,
        position: &Self::Position,
        mv: &Move,
    ) -> Result<(Self::Position, String), IllegalMove>;

    /// Terminal status of `position` taken on its own.
    fn status(&self, position: &Self::Position) -> GameStatus;

    /// The side whose turn it is.
    fn turn_to_move(&self, position: &Self::Position) -> Side;

    /// Whether the side to move is in check.
    fn is_in_check(&self, position: &Self::Position) -> bool;

    /// Piece on `square`, if any.
    fn piece_at(&self, position: &Self::Position, square: Square) -> Option<Piece>;

    /// Interprets move text (as produced by an oracle) in `position`.
    ///
    /// Returns `None` if the text names no legal move.
    fn parse_move(&self, position: &Self::Position, text: &str) -> Option<Move>;

    /// Key under which positions count as repeated, if the engine tracks it.
    fn repetition_key(&self, _position: &Self::Position) -> Option<String> {
        None
    }
}

//! Errors surfaced by session actions.

use crate::games::chess::{Move, Square};
use serde::Serialize;

/// Why a session action was refused.
///
/// Every variant is recoverable: the session state is untouched and the
/// transient square selection is cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum SessionError {
    /// No side has been chosen yet.
    #[display("No game in progress. Start a new game first")]
    NoActiveGame,

    /// The oracle is thinking; manual input is locked.
    #[display("Analysis in progress, please wait")]
    AnalysisInProgress,

    /// The live position is terminal.
    #[display("Game is over")]
    GameOver,

    /// The oracle's side is to move.
    #[display("It's not your turn")]
    WrongTurn,

    /// Nothing stands on the origin square.
    #[display("No piece on {}", _0)]
    NoPieceAtSource(Square),

    /// The origin holds one of the oracle's pieces.
    #[display("The piece on {} is not yours", _0)]
    WrongPieceColor(Square),

    /// The rules engine rejected the move.
    #[display("Invalid move {}", _0)]
    IllegalMove(Move),

    /// The oracle failed, timed out, or suggested something illegal.
    #[display("AI move suggestion failed: {}", _0)]
    OracleFailure(String),

    /// A response arrived for a position that is no longer live.
    #[display("Stale oracle response discarded")]
    StaleOracleResponse,

    /// The last move was not played by the manual side.
    #[display("Nothing to undo")]
    NothingToUndo,
}

impl SessionError {
    /// Whether this error should be shown to the user.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, SessionError::StaleOracleResponse)
    }
}

impl std::error::Error for SessionError {}

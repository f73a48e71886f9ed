//! Gatekeeping for moves entered by the human.

use super::error::SessionError;
use super::state::SessionState;
use crate::games::chess::{DEFAULT_PROMOTION, Move, RulesEngine, Side, Square};
use serde::Serialize;
use tracing::{debug, instrument};

/// Transient click-to-move selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum Selection {
    /// Nothing selected.
    #[default]
    Unselected,
    /// An own piece is picked up.
    Selected {
        /// Square of the picked piece.
        origin: Square,
        /// Legal destinations from `origin`.
        destinations: Vec<Square>,
    },
}

impl Selection {
    /// Selected origin, if any.
    pub fn origin(&self) -> Option<Square> {
        match self {
            Selection::Unselected => None,
            Selection::Selected { origin, .. } => Some(*origin),
        }
    }

    /// Origin followed by its destinations, for highlighting.
    pub fn highlighted(&self) -> Vec<Square> {
        match self {
            Selection::Unselected => Vec::new(),
            Selection::Selected {
                origin,
                destinations,
            } => std::iter::once(*origin)
                .chain(destinations.iter().copied())
                .collect(),
        }
    }
}

/// Two-phase check for manual moves: eligibility, then legality.
///
/// All checks run against the live position, never the displayed one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualMoveValidator;

impl ManualMoveValidator {
    /// Phase 1: may the human move at all right now?
    ///
    /// Returns the manual side.
    #[instrument(skip_all)]
    pub fn check_eligibility<R>(
        rules: &R,
        session: &SessionState<R::Position>,
        awaiting_oracle: bool,
    ) -> Result<Side, SessionError>
    where
        R: RulesEngine,
    {
        let manual_side = session.manual_side().ok_or(SessionError::NoActiveGame)?;
        if awaiting_oracle {
            return Err(SessionError::AnalysisInProgress);
        }
        if session.status(rules).is_over() {
            return Err(SessionError::GameOver);
        }
        if rules.turn_to_move(session.live_position()) != manual_side {
            return Err(SessionError::WrongTurn);
        }
        Ok(manual_side)
    }

    /// Checks that `origin` holds one of the manual side's pieces.
    #[instrument(skip(rules, session))]
    pub fn check_origin<R>(
        rules: &R,
        session: &SessionState<R::Position>,
        manual_side: Side,
        origin: Square,
    ) -> Result<(), SessionError>
    where
        R: RulesEngine,
    {
        match rules.piece_at(session.live_position(), origin) {
            None => Err(SessionError::NoPieceAtSource(origin)),
            Some(piece) if piece.side != manual_side => Err(SessionError::WrongPieceColor(origin)),
            Some(_) => Ok(()),
        }
    }

    /// Legal destinations from `origin` in the live position.
    pub fn destinations<R>(rules: &R, session: &SessionState<R::Position>, origin: Square) -> Vec<Square>
    where
        R: RulesEngine,
    {
        let mut squares: Vec<Square> = rules
            .legal_moves(session.live_position(), Some(origin))
            .into_iter()
            .map(|m| m.to)
            .collect();
        squares.sort();
        squares.dedup();
        squares
    }

    /// Phase 2: resolve `from → to` into a legal move.
    ///
    /// Promotions resolve to [`DEFAULT_PROMOTION`].
    #[instrument(skip(rules, session))]
    pub fn check_move<R>(
        rules: &R,
        session: &SessionState<R::Position>,
        manual_side: Side,
        from: Square,
        to: Square,
    ) -> Result<Move, SessionError>
    where
        R: RulesEngine,
    {
        Self::check_origin(rules, session, manual_side, from)?;

        let candidates: Vec<Move> = rules
            .legal_moves(session.live_position(), Some(from))
            .into_iter()
            .filter(|m| m.to == to)
            .collect();

        let chosen = candidates
            .iter()
            .find(|m| m.promotion == Some(DEFAULT_PROMOTION))
            .or_else(|| candidates.first())
            .copied()
            .ok_or(SessionError::IllegalMove(Move::new(from, to)))?;

        debug!(mv = %chosen, "Manual move validated");
        Ok(chosen)
    }

    /// Both phases.
    pub fn validate<R>(
        rules: &R,
        session: &SessionState<R::Position>,
        awaiting_oracle: bool,
        from: Square,
        to: Square,
    ) -> Result<Move, SessionError>
    where
        R: RulesEngine,
    {
        let manual_side = Self::check_eligibility(rules, session, awaiting_oracle)?;
        Self::check_move(rules, session, manual_side, from, to)
    }
}

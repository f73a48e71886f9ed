//! The authoritative record of one game.

use super::error::SessionError;
use super::invariants::verify_session;
use crate::games::chess::{DrawReason, GameStatus, Move, RulesEngine, Side};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Direction for stepping through history.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumString, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// Towards the initial position.
    Back,
    /// Towards the live position.
    Forward,
}

/// Positions, notation and the display cursor of one game.
///
/// `history` is never empty. Moves are always applied to the last entry;
/// the cursor only selects what is displayed.
#[derive(Debug, Clone)]
pub struct SessionState<P> {
    history: Vec<P>,
    move_log: Vec<String>,
    cursor: usize,
    oracle_side: Option<Side>,
    generation: u64,
}

impl<P: Clone + std::fmt::Debug> SessionState<P> {
    /// Creates a state with no game in progress, showing `initial`.
    #[instrument(skip(initial))]
    pub fn idle(initial: P) -> Self {
        Self {
            history: vec![initial],
            move_log: Vec::new(),
            cursor: 0,
            oracle_side: None,
            generation: 0,
        }
    }

    /// Replaces the whole game: history becomes `[initial]`, log empty,
    /// cursor 0, oracle assigned to `oracle_side`.
    ///
    /// The generation keeps counting so tickets from the previous game can
    /// never match.
    #[instrument(skip(self, initial), fields(generation = self.generation))]
    pub fn reset(&mut self, initial: P, oracle_side: Side) {
        self.history = vec![initial];
        self.move_log.clear();
        self.cursor = 0;
        self.oracle_side = Some(oracle_side);
        self.generation += 1;
        info!(?oracle_side, generation = self.generation, "Session reset");
        verify_session(self);
    }

    /// Full position history, initial position first.
    pub fn history(&self) -> &[P] {
        &self.history
    }

    /// Notation of each applied move, parallel to `history[1..]`.
    pub fn move_log(&self) -> &[String] {
        &self.move_log
    }

    /// Index of the displayed position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Index of the live position.
    pub fn last_index(&self) -> usize {
        self.history.len() - 1
    }

    /// Side played by the oracle; `None` when no game is in progress.
    pub fn oracle_side(&self) -> Option<Side> {
        self.oracle_side
    }

    /// Side played by the human.
    pub fn manual_side(&self) -> Option<Side> {
        self.oracle_side.map(Side::opponent)
    }

    /// Stamp identifying the live position; changes on every history mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of moves played.
    pub fn ply(&self) -> usize {
        self.move_log.len()
    }

    /// The position moves are applied to.
    pub fn live_position(&self) -> &P {
        &self.history[self.history.len() - 1]
    }

    /// The position selected by the cursor.
    pub fn displayed_position(&self) -> &P {
        &self.history[self.cursor]
    }

    /// Whether the cursor is on the live position.
    pub fn is_live_view(&self) -> bool {
        self.cursor == self.last_index()
    }

    /// Terminal status of the live position, including threefold repetition.
    pub fn status<R>(&self, rules: &R) -> GameStatus
    where
        R: RulesEngine<Position = P>,
    {
        let live = self.live_position();
        let status = rules.status(live);
        if status.is_over() {
            return status;
        }

        if let Some(key) = rules.repetition_key(live) {
            let occurrences = self
                .history
                .iter()
                .filter(|p| rules.repetition_key(p).as_deref() == Some(key.as_str()))
                .count();
            if occurrences >= 3 {
                return GameStatus::Draw(DrawReason::Repetition);
            }
        }

        GameStatus::InProgress
    }

    /// Applies `mv` to the live position.
    ///
    /// The single mutation point for both the oracle and the manual path.
    /// On success the cursor snaps to the new live position.
    ///
    /// # Errors
    ///
    /// `NoActiveGame`, `GameOver`, or `IllegalMove` if the engine refuses;
    /// nothing is mutated on error.
    #[instrument(skip(self, rules, mv), fields(ply = self.ply(), mv = %mv))]
    pub fn apply_move<R>(&mut self, rules: &R, mv: &Move) -> Result<String, SessionError>
    where
        R: RulesEngine<Position = P>,
    {
        if self.oracle_side.is_none() {
            return Err(SessionError::NoActiveGame);
        }
        if self.status(rules).is_over() {
            return Err(SessionError::GameOver);
        }

        let (next, notation) = rules.apply(self.live_position(), mv).map_err(|e| {
            warn!(error = %e, "Rules engine rejected move");
            SessionError::IllegalMove(*mv)
        })?;

        self.history.push(next);
        self.move_log.push(notation.clone());
        self.cursor = self.last_index();
        self.generation += 1;

        info!(notation = %notation, ply = self.ply(), "Move applied");
        verify_session(self);
        Ok(notation)
    }

    /// Removes the last move, returning its notation.
    #[instrument(skip(self), fields(ply = self.ply()))]
    pub(crate) fn pop_move(&mut self) -> Option<String> {
        if self.move_log.is_empty() {
            return None;
        }
        self.history.pop();
        let notation = self.move_log.pop();
        self.cursor = self.last_index();
        self.generation += 1;
        debug!(?notation, "Move taken back");
        verify_session(self);
        notation
    }

    /// Moves the cursor one step, clamped to the history bounds.
    ///
    /// Returns whether the cursor moved.
    #[instrument(skip(self), fields(cursor = self.cursor))]
    pub fn navigate(&mut self, direction: Direction) -> bool {
        let target = match direction {
            Direction::Back => self.cursor.checked_sub(1),
            Direction::Forward => Some(self.cursor + 1).filter(|c| *c <= self.last_index()),
        };

        match target {
            Some(cursor) => {
                self.cursor = cursor;
                debug!(cursor, "Cursor moved");
                true
            }
            None => {
                debug!("Cursor at bound");
                false
            }
        }
    }
}

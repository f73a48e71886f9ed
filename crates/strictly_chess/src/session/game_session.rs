//! One interactive game between a human and a move oracle.

use super::coordinator::{OracleRequest, RequestTicket, TurnCoordinator};
use super::error::SessionError;
use super::state::{Direction, SessionState};
use super::validator::{ManualMoveValidator, Selection};
use super::view::{Banner, SessionView, move_pairs};
use crate::games::chess::{GameStatus, RulesEngine, Side, Square};
use crate::oracle::OracleError;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

/// What a square click did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ClickOutcome {
    /// An own piece was picked up.
    Selected {
        /// The picked square.
        origin: Square,
    },
    /// The selected piece was put back.
    Deselected,
    /// A move was played.
    Moved {
        /// Its notation.
        notation: String,
    },
    /// The move attempt failed on another own piece, which is now picked up.
    Reselected {
        /// The newly picked square.
        origin: Square,
    },
}

/// A game session: state, turn coordination and manual input.
///
/// Synchronous by construction. Oracle work leaves through
/// [`GameSession::take_oracle_request`] and comes back through
/// [`GameSession::resolve_oracle`].
#[derive(Debug)]
pub struct GameSession<R: RulesEngine> {
    rules: R,
    state: SessionState<R::Position>,
    coordinator: TurnCoordinator<R::Position>,
    selection: Selection,
    orientation: Side,
    notice: Option<String>,
}

impl<R: RulesEngine> GameSession<R> {
    /// Creates a session with no game in progress.
    #[instrument(skip(rules))]
    pub fn new(rules: R, strength: u8) -> Self {
        info!("Creating game session");
        let initial = rules.initial_position();
        Self {
            state: SessionState::idle(initial),
            rules,
            coordinator: TurnCoordinator::new(strength),
            selection: Selection::Unselected,
            orientation: Side::First,
            notice: None,
        }
    }

    /// The rules engine.
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Game state.
    pub fn state(&self) -> &SessionState<R::Position> {
        &self.state
    }

    /// Turn coordinator.
    pub fn coordinator(&self) -> &TurnCoordinator<R::Position> {
        &self.coordinator
    }

    /// Click selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Side shown at the bottom.
    pub fn orientation(&self) -> Side {
        self.orientation
    }

    /// Current notice.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Status of the live position.
    pub fn status(&self) -> GameStatus {
        self.state.status(&self.rules)
    }

    // ─────────────────────────────────────────────────────────────
    //  Game lifecycle
    // ─────────────────────────────────────────────────────────────

    /// Starts a new game from the initial position.
    pub fn start_new_game(&mut self, oracle_side: Side) {
        let initial = self.rules.initial_position();
        self.start_from_position(oracle_side, initial);
    }

    /// Starts a new game from `position`.
    ///
    /// Any outstanding oracle request is invalidated. The board is oriented
    /// with the manual side at the bottom.
    #[instrument(skip(self, position))]
    pub fn start_from_position(&mut self, oracle_side: Side, position: R::Position) {
        if let Some(ticket) = self.coordinator.invalidate() {
            info!(?ticket, "New game abandons outstanding oracle request");
        }
        self.state.reset(position, oracle_side);
        self.orientation = oracle_side.opponent();
        self.notice = None;
        self.after_mutation();
    }

    /// Restarts with the sides swapped.
    ///
    /// # Errors
    ///
    /// `NoActiveGame` if no side was ever chosen.
    #[instrument(skip(self))]
    pub fn change_side(&mut self) -> Result<Side, SessionError> {
        let current = self
            .state
            .oracle_side()
            .ok_or_else(|| self.fail(SessionError::NoActiveGame))?;
        let oracle_side = current.opponent();
        self.start_new_game(oracle_side);
        Ok(oracle_side)
    }

    /// Flips the display orientation.
    pub fn flip_orientation(&mut self) -> Side {
        self.orientation = self.orientation.opponent();
        debug!(orientation = ?self.orientation, "Board flipped");
        self.orientation
    }

    /// Takes back the last move if the manual side played it.
    ///
    /// # Errors
    ///
    /// `NoActiveGame`, `AnalysisInProgress`, or `NothingToUndo` when the
    /// log is empty or its last entry is the oracle's.
    #[instrument(skip(self))]
    pub fn undo_last_manual_move(&mut self) -> Result<String, SessionError> {
        let manual_side = self
            .state
            .manual_side()
            .ok_or_else(|| self.fail(SessionError::NoActiveGame))?;
        if self.coordinator.is_awaiting() {
            return Err(self.fail(SessionError::AnalysisInProgress));
        }

        let history = self.state.history();
        let last_mover = history
            .len()
            .checked_sub(2)
            .map(|i| self.rules.turn_to_move(&history[i]));
        if last_mover != Some(manual_side) {
            return Err(self.fail(SessionError::NothingToUndo));
        }

        let notation = self
            .state
            .pop_move()
            .ok_or_else(|| self.fail(SessionError::NothingToUndo))?;
        info!(notation = %notation, "Manual move undone");
        self.notice = None;
        self.after_mutation();
        Ok(notation)
    }

    /// Steps the display cursor; never affects play.
    pub fn navigate(&mut self, direction: Direction) -> bool {
        self.state.navigate(direction)
    }

    // ─────────────────────────────────────────────────────────────
    //  Manual input
    // ─────────────────────────────────────────────────────────────

    /// Handles a click on `square` (click-to-move).
    ///
    /// # Errors
    ///
    /// Any eligibility or legality error; the selection is cleared.
    #[instrument(skip(self), fields(selection = ?self.selection.origin()))]
    pub fn square_click(&mut self, square: Square) -> Result<ClickOutcome, SessionError> {
        match std::mem::take(&mut self.selection) {
            Selection::Unselected => self
                .select(square)
                .map(|()| ClickOutcome::Selected { origin: square })
                .map_err(|e| self.fail(e)),
            Selection::Selected { origin, .. } if origin == square => {
                debug!(%square, "Selection cleared");
                Ok(ClickOutcome::Deselected)
            }
            Selection::Selected { origin, .. } => match self.play_manual(origin, square) {
                Ok(notation) => Ok(ClickOutcome::Moved { notation }),
                // Clicking another own piece switches the selection.
                Err(_) if self.select(square).is_ok() => {
                    self.notice = None;
                    Ok(ClickOutcome::Reselected { origin: square })
                }
                Err(e) => Err(self.fail(e)),
            },
        }
    }

    /// Handles a drag from `from` to `to`, bypassing click selection.
    ///
    /// # Errors
    ///
    /// Any eligibility or legality error.
    #[instrument(skip(self))]
    pub fn piece_drop(&mut self, from: Square, to: Square) -> Result<String, SessionError> {
        self.selection = Selection::Unselected;
        self.play_manual(from, to).map_err(|e| self.fail(e))
    }

    fn select(&mut self, square: Square) -> Result<(), SessionError> {
        let result = ManualMoveValidator::check_eligibility(
            &self.rules,
            &self.state,
            self.coordinator.is_awaiting(),
        )
        .and_then(|side| ManualMoveValidator::check_origin(&self.rules, &self.state, side, square));

        match result {
            Ok(()) => {
                let destinations = ManualMoveValidator::destinations(&self.rules, &self.state, square);
                debug!(%square, count = destinations.len(), "Piece selected");
                self.selection = Selection::Selected {
                    origin: square,
                    destinations,
                };
                Ok(())
            }
            Err(e) => {
                self.selection = Selection::Unselected;
                Err(e)
            }
        }
    }

    fn play_manual(&mut self, from: Square, to: Square) -> Result<String, SessionError> {
        let mv = ManualMoveValidator::validate(
            &self.rules,
            &self.state,
            self.coordinator.is_awaiting(),
            from,
            to,
        )?;
        let notation = self.state.apply_move(&self.rules, &mv)?;
        self.notice = None;
        self.after_mutation();
        Ok(notation)
    }

    // ─────────────────────────────────────────────────────────────
    //  Oracle path
    // ─────────────────────────────────────────────────────────────

    /// Takes the pending oracle request, if one was just issued.
    pub fn take_oracle_request(&mut self) -> Option<OracleRequest<R::Position>> {
        self.coordinator.take_request()
    }

    /// Feeds an oracle result back into the session.
    ///
    /// Stale responses are dropped silently (the error is returned but no
    /// notice is set).
    ///
    /// # Errors
    ///
    /// `StaleOracleResponse` or `OracleFailure`.
    #[instrument(skip(self, result))]
    pub fn resolve_oracle(
        &mut self,
        ticket: RequestTicket,
        result: Result<String, OracleError>,
    ) -> Result<String, SessionError> {
        match self
            .coordinator
            .resolve(&self.rules, &mut self.state, ticket, result)
        {
            Ok(notation) => {
                info!(notation = %notation, "Oracle move played");
                self.notice = None;
                self.after_mutation();
                Ok(notation)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Asks the oracle again after a failure.
    ///
    /// Never happens automatically. Returns whether a request was issued.
    ///
    /// # Errors
    ///
    /// `NoActiveGame` or `AnalysisInProgress`.
    #[instrument(skip(self))]
    pub fn retry_oracle(&mut self) -> Result<bool, SessionError> {
        if self.state.oracle_side().is_none() {
            return Err(self.fail(SessionError::NoActiveGame));
        }
        if self.coordinator.is_awaiting() {
            return Err(self.fail(SessionError::AnalysisInProgress));
        }
        self.notice = None;
        let issued = self.coordinator.evaluate(&self.rules, &self.state);
        info!(issued, "Oracle retry requested");
        Ok(issued)
    }

    /// Clears the current notice.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    // ─────────────────────────────────────────────────────────────
    //  Rendering
    // ─────────────────────────────────────────────────────────────

    /// Builds the rendered surface.
    pub fn view(&self) -> SessionView<R::Position> {
        let live = self.state.live_position();
        let status = self.status();
        let turn = self.rules.turn_to_move(live);

        let mut banners = Vec::new();
        if self.coordinator.is_awaiting() {
            banners.push(Banner::Analyzing);
        }
        if let Some(message) = &self.notice {
            banners.push(Banner::Notice(message.clone()));
        }
        if status.is_over() {
            banners.push(Banner::GameOver(status));
        } else if self.rules.is_in_check(live) {
            banners.push(Banner::Check(turn));
        }

        SessionView {
            position: self.state.displayed_position().clone(),
            live: self.state.is_live_view(),
            cursor: self.state.cursor(),
            last_index: self.state.last_index(),
            oracle_side: self.state.oracle_side(),
            turn,
            status,
            orientation: self.orientation,
            selected: self.selection.origin(),
            highlighted: self.selection.highlighted(),
            banners,
            move_pairs: move_pairs(self.state.move_log()),
        }
    }

    // ─────────────────────────────────────────────────────────────
    //  Internals
    // ─────────────────────────────────────────────────────────────

    /// Runs after every history mutation.
    fn after_mutation(&mut self) {
        self.selection = Selection::Unselected;
        let status = self.status();
        if status.is_over() {
            info!(%status, winner = ?status.winner(), "Game finished");
        }
        self.coordinator.evaluate(&self.rules, &self.state);
    }

    /// Records a failure: clears selection and surfaces a notice.
    fn fail(&mut self, error: SessionError) -> SessionError {
        self.selection = Selection::Unselected;
        if error.is_user_visible() {
            warn!(error = %error, "Session action refused");
            self.notice = Some(error.to_string());
        } else {
            debug!(error = %error, "Internal session error");
        }
        error
    }
}

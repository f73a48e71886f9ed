//! Turn coordination between the manual side and the oracle.
//!
//! The coordinator never awaits anything. When the oracle's side is to
//! move it places one [`OracleRequest`] in its outbox; whoever hosts the
//! session runs the request and hands the result back through
//! [`TurnCoordinator::resolve`] together with the request's ticket.

use super::error::SessionError;
use super::state::SessionState;
use crate::games::chess::RulesEngine;
use crate::oracle::OracleError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Identifies one oracle request and the position it was issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestTicket {
    /// Session generation of the position the request was issued for.
    pub generation: u64,
    /// Ply of that position.
    pub ply: usize,
    /// Per-coordinator serial number; distinguishes re-issued requests.
    pub serial: u64,
}

/// A request for the oracle to move in `position`.
#[derive(Debug, Clone)]
pub struct OracleRequest<P> {
    /// Stamp to hand back with the result.
    pub ticket: RequestTicket,
    /// The live position at issue time.
    pub position: P,
    /// Search strength passed to the oracle.
    pub strength: u8,
}

/// State of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// No request outstanding.
    Idle,
    /// Exactly one request outstanding.
    AwaitingOracle {
        /// The outstanding request.
        ticket: RequestTicket,
    },
}

/// Drives at most one oracle request at a time.
#[derive(Debug, Clone)]
pub struct TurnCoordinator<P> {
    state: CoordinatorState,
    outbox: Option<OracleRequest<P>>,
    next_serial: u64,
    strength: u8,
}

impl<P: Clone + std::fmt::Debug> TurnCoordinator<P> {
    /// Creates an idle coordinator asking the oracle at `strength`.
    #[instrument]
    pub fn new(strength: u8) -> Self {
        Self {
            state: CoordinatorState::Idle,
            outbox: None,
            next_serial: 0,
            strength,
        }
    }

    /// Current state.
    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Whether a request is outstanding.
    pub fn is_awaiting(&self) -> bool {
        matches!(self.state, CoordinatorState::AwaitingOracle { .. })
    }

    /// Oracle search strength.
    pub fn strength(&self) -> u8 {
        self.strength
    }

    /// Re-evaluates after a state change.
    ///
    /// Transitions Idle → AwaitingOracle when the live position's side to
    /// move is the oracle's, the game is not over and nothing is
    /// outstanding. Returns whether a request was issued.
    #[instrument(skip(self, rules, session), fields(generation = session.generation()))]
    pub fn evaluate<R>(&mut self, rules: &R, session: &SessionState<P>) -> bool
    where
        R: RulesEngine<Position = P>,
    {
        if self.is_awaiting() {
            debug!("Request already outstanding");
            return false;
        }

        let Some(oracle_side) = session.oracle_side() else {
            return false;
        };

        let live = session.live_position();
        if rules.turn_to_move(live) != oracle_side {
            return false;
        }

        let status = session.status(rules);
        if status.is_over() {
            debug!(%status, "Game over, oracle stays idle");
            return false;
        }

        let ticket = RequestTicket {
            generation: session.generation(),
            ply: session.ply(),
            serial: self.next_serial,
        };
        self.next_serial += 1;

        self.state = CoordinatorState::AwaitingOracle { ticket };
        self.outbox = Some(OracleRequest {
            ticket,
            position: live.clone(),
            strength: self.strength,
        });
        info!(?ticket, ?oracle_side, "Oracle to move, request issued");
        true
    }

    /// Takes the pending request, at most once per transition.
    pub fn take_request(&mut self) -> Option<OracleRequest<P>> {
        self.outbox.take()
    }

    /// Drops the outstanding request so a late response is treated as stale.
    #[instrument(skip(self))]
    pub fn invalidate(&mut self) -> Option<RequestTicket> {
        self.outbox = None;
        match std::mem::replace(&mut self.state, CoordinatorState::Idle) {
            CoordinatorState::AwaitingOracle { ticket } => {
                debug!(?ticket, "Outstanding request invalidated");
                Some(ticket)
            }
            CoordinatorState::Idle => None,
        }
    }

    /// Handles an oracle response, returning the applied move's notation.
    ///
    /// # Errors
    ///
    /// - `StaleOracleResponse` if `ticket` is not the outstanding request or
    ///   the live position changed since it was issued; nothing changes.
    /// - `OracleFailure` if the oracle failed or its text is not a legal move
    ///   in the stamped position; the coordinator returns to Idle and the
    ///   oracle's side stays to move.
    #[instrument(skip(self, rules, session, result))]
    pub fn resolve<R>(
        &mut self,
        rules: &R,
        session: &mut SessionState<P>,
        ticket: RequestTicket,
        result: Result<String, OracleError>,
    ) -> Result<String, SessionError>
    where
        R: RulesEngine<Position = P>,
    {
        match self.state {
            CoordinatorState::AwaitingOracle { ticket: outstanding }
                if outstanding == ticket && ticket.generation == session.generation() => {}
            _ => {
                debug!(state = ?self.state, "Discarding stale oracle response");
                return Err(SessionError::StaleOracleResponse);
            }
        }

        self.state = CoordinatorState::Idle;
        self.outbox = None;

        let text = result.map_err(|e| {
            warn!(error = %e, "Oracle failed");
            SessionError::OracleFailure(e.message)
        })?;

        // Generation matched, so the live position is the one the ticket names.
        let position = session.live_position().clone();
        let mv = rules
            .parse_move(&position, &text)
            .filter(|mv| rules.legal_moves(&position, Some(mv.from)).contains(mv))
            .ok_or_else(|| {
                warn!(suggestion = %text, "Oracle suggested an illegal move");
                SessionError::OracleFailure(format!("'{}' is not a legal move", text.trim()))
            })?;

        session.apply_move(rules, &mv).map_err(|e| {
            warn!(error = %e, "Oracle move could not be applied");
            SessionError::OracleFailure(e.to_string())
        })
    }
}

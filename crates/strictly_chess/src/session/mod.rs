//! Session management: game state, turn coordination and manual input.

mod coordinator;
mod error;
mod game_session;
mod invariants;
mod state;
mod validator;
mod view;

pub use coordinator::{CoordinatorState, OracleRequest, RequestTicket, TurnCoordinator};
pub use error::SessionError;
pub use game_session::{ClickOutcome, GameSession};
pub use invariants::{
    CheckFailure, CursorInBounds, MoveLogParallel, SessionChecks, StateCheck, StateChecks,
};
pub use state::{Direction, SessionState};
pub use validator::{ManualMoveValidator, Selection};
pub use view::{Banner, MovePair, SessionView, move_pairs};

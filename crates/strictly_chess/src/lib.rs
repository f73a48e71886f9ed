//! Strictly Chess library - a chess session manager with a pluggable move oracle
//!
//! One human plays against an asynchronous move oracle. The session keeps
//! the authoritative position history, decides whose turn it is, validates
//! manual input, and discards oracle answers that arrive for a position
//! that is no longer live.
//!
//! # Architecture
//!
//! - **Games**: chess domain types and the [`RulesEngine`] seam, backed by
//!   `shakmaty` in [`StandardChess`]
//! - **Oracle**: [`MoveOracle`] implementations (HTTP engine, local)
//! - **Session**: the synchronous [`GameSession`] core
//! - **Driver**: [`SessionDriver`], a tokio actor hosting a session
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_chess::{GameSession, LocalOracle, SessionCommand, SessionDriver, Side, StandardChess};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let rules = StandardChess::new();
//! let mut session = GameSession::new(rules, 10);
//! session.start_new_game(Side::Second);
//!
//! let oracle = Arc::new(LocalOracle::new("Local", rules));
//! let (handle, _driver) = SessionDriver::spawn(session, oracle, None);
//! handle
//!     .send(SessionCommand::PieceDrop {
//!         from: "e2".parse()?,
//!         to: "e4".parse()?,
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod driver;
mod games;
mod oracle;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, ORACLE_URL_ENV, OracleKind, SessionConfig};

// Crate-level exports - Driver
pub use driver::{CommandOutcome, DriverError, SessionCommand, SessionDriver, SessionHandle};

// Crate-level exports - Chess types and rules
pub use games::chess::{
    ChessPosition, DEFAULT_PROMOTION, DrawReason, FenError, GameStatus, IllegalMove, Move,
    ParseNotationError, Piece, PieceKind, RulesEngine, Side, Square, StandardChess,
};

// Crate-level exports - Oracles
pub use oracle::{HttpOracle, LocalOracle, MoveOracle, OracleError};

// Crate-level exports - Session management
pub use session::{
    Banner, CheckFailure, ClickOutcome, CoordinatorState, CursorInBounds, Direction, GameSession,
    ManualMoveValidator, MoveLogParallel, MovePair, OracleRequest, RequestTicket, Selection,
    SessionChecks, SessionError, SessionState, SessionView, StateCheck, StateChecks,
    TurnCoordinator, move_pairs,
};

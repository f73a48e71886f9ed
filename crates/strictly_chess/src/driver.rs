//! Async host for a [`GameSession`].
//!
//! The driver is an actor task. User commands and oracle resolutions share
//! one mpsc inbox and are processed one at a time; after each message the
//! current [`SessionView`] is published on a watch channel. Oracle requests
//! run as spawned tasks so the inbox never blocks on the network.

use crate::games::chess::{RulesEngine, Side, Square};
use crate::oracle::{MoveOracle, OracleError};
use crate::session::{
    ClickOutcome, CoordinatorState, Direction, GameSession, RequestTicket, SessionError,
    SessionView,
};
use derive_more::{Display, Error};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// A user action sent to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Start a new game with the oracle playing the given side.
    NewGame(Side),
    /// Restart with the sides swapped.
    ChangeSide,
    /// Flip the board orientation.
    FlipBoard,
    /// Take back the last manual move.
    Undo,
    /// Step through history.
    Navigate(Direction),
    /// Click a square.
    SquareClick(Square),
    /// Drag a piece.
    PieceDrop {
        /// Origin.
        from: Square,
        /// Destination.
        to: Square,
    },
    /// Ask the oracle again after a failure.
    RetryOracle,
    /// Clear the notice banner.
    DismissNotice,
}

/// Result of one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CommandOutcome {
    /// A new game started.
    Started {
        /// Side the oracle plays.
        oracle_side: Side,
    },
    /// Board flipped.
    Flipped {
        /// Side now at the bottom.
        orientation: Side,
    },
    /// A manual move was taken back.
    Undone {
        /// Notation of the removed move.
        notation: String,
    },
    /// Navigation processed.
    Navigated {
        /// Whether the cursor moved.
        moved: bool,
    },
    /// Square click processed.
    Clicked(ClickOutcome),
    /// A dropped piece was moved.
    Played {
        /// Notation of the move.
        notation: String,
    },
    /// Oracle retry processed.
    Retried {
        /// Whether a request went out.
        issued: bool,
    },
    /// Notice cleared.
    Dismissed,
    /// The session refused the action; state is unchanged.
    Refused(SessionError),
}

/// The driver is gone or never answered.
#[derive(Debug, Clone, Display, Error)]
#[display("Driver error: {} at {}:{}", message, file, line)]
pub struct DriverError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DriverError {
    /// Creates a new driver error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        error!(error_message = %message, "Driver error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[derive(Debug)]
enum DriverMessage {
    Command {
        command: SessionCommand,
        reply: oneshot::Sender<CommandOutcome>,
    },
    OracleResolved {
        ticket: RequestTicket,
        result: Result<String, OracleError>,
    },
    Shutdown,
}

/// Cloneable front-end handle to a running driver.
#[derive(Debug, Clone)]
pub struct SessionHandle<P> {
    inbox: mpsc::UnboundedSender<DriverMessage>,
    views: watch::Receiver<SessionView<P>>,
}

impl<P: Clone> SessionHandle<P> {
    /// Sends a command and waits for its outcome.
    ///
    /// # Errors
    ///
    /// Fails only if the driver has stopped.
    #[instrument(skip(self))]
    pub async fn send(&self, command: SessionCommand) -> Result<CommandOutcome, DriverError> {
        let (reply, outcome) = oneshot::channel();
        self.inbox
            .send(DriverMessage::Command { command, reply })
            .map_err(|_| DriverError::new("Session driver has stopped"))?;
        outcome
            .await
            .map_err(|_| DriverError::new("Session driver dropped the command"))
    }

    /// Latest published view.
    pub fn view(&self) -> SessionView<P> {
        self.views.borrow().clone()
    }

    /// A receiver that wakes on every published view.
    pub fn subscribe(&self) -> watch::Receiver<SessionView<P>> {
        self.views.clone()
    }

    /// Waits until a published view satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// Fails if the driver stops first.
    pub async fn wait_until(
        &self,
        predicate: impl FnMut(&SessionView<P>) -> bool,
    ) -> Result<SessionView<P>, DriverError> {
        let mut views = self.views.clone();
        let view = views
            .wait_for(predicate)
            .await
            .map_err(|_| DriverError::new("Session driver stopped while waiting"))?;
        Ok(view.clone())
    }

    /// Asks the driver to stop after the current message.
    pub fn shutdown(&self) {
        if self.inbox.send(DriverMessage::Shutdown).is_err() {
            debug!("Driver already stopped");
        }
    }
}

/// Actor owning a [`GameSession`] and the oracle tasks it spawns.
pub struct SessionDriver<R: RulesEngine> {
    session: GameSession<R>,
    oracle: Arc<dyn MoveOracle<R::Position>>,
    timeout: Option<Duration>,
    inbox: mpsc::WeakUnboundedSender<DriverMessage>,
    views: watch::Sender<SessionView<R::Position>>,
    in_flight: Option<(RequestTicket, JoinHandle<()>)>,
}

impl<R> SessionDriver<R>
where
    R: RulesEngine + 'static,
{
    /// Spawns the actor on the current runtime.
    ///
    /// The session may already hold a game; if the oracle is to move its
    /// request is dispatched immediately.
    #[instrument(skip(session, oracle), fields(oracle = %oracle.name()))]
    pub fn spawn(
        session: GameSession<R>,
        oracle: Arc<dyn MoveOracle<R::Position>>,
        timeout: Option<Duration>,
    ) -> (SessionHandle<R::Position>, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (views, view_rx) = watch::channel(session.view());

        let driver = Self {
            session,
            oracle,
            timeout,
            inbox: tx.downgrade(),
            views,
            in_flight: None,
        };
        let task = tokio::spawn(driver.run(rx));
        info!("Session driver started");

        (
            SessionHandle {
                inbox: tx,
                views: view_rx,
            },
            task,
        )
    }

    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<DriverMessage>) {
        self.dispatch_oracle();
        self.publish();

        while let Some(message) = inbox.recv().await {
            let pending_reply = match message {
                DriverMessage::Command { command, reply } => Some((self.apply(command), reply)),
                DriverMessage::OracleResolved { ticket, result } => {
                    self.resolve(ticket, result);
                    None
                }
                DriverMessage::Shutdown => {
                    info!("Shutdown requested");
                    break;
                }
            };
            self.cancel_stale_oracle();
            self.dispatch_oracle();
            self.publish();

            // Reply after publishing so the caller sees the new view.
            if let Some((outcome, reply)) = pending_reply {
                if reply.send(outcome).is_err() {
                    debug!("Command sender went away before the reply");
                }
            }
        }

        if let Some((ticket, task)) = self.in_flight.take() {
            debug!(?ticket, "Aborting oracle task on shutdown");
            task.abort();
        }
        info!("Session driver stopped");
    }

    #[instrument(skip(self))]
    fn apply(&mut self, command: SessionCommand) -> CommandOutcome {
        let session = &mut self.session;
        let result = match command {
            SessionCommand::NewGame(oracle_side) => {
                session.start_new_game(oracle_side);
                Ok(CommandOutcome::Started { oracle_side })
            }
            SessionCommand::ChangeSide => session
                .change_side()
                .map(|oracle_side| CommandOutcome::Started { oracle_side }),
            SessionCommand::FlipBoard => Ok(CommandOutcome::Flipped {
                orientation: session.flip_orientation(),
            }),
            SessionCommand::Undo => session
                .undo_last_manual_move()
                .map(|notation| CommandOutcome::Undone { notation }),
            SessionCommand::Navigate(direction) => Ok(CommandOutcome::Navigated {
                moved: session.navigate(direction),
            }),
            SessionCommand::SquareClick(square) => {
                session.square_click(square).map(CommandOutcome::Clicked)
            }
            SessionCommand::PieceDrop { from, to } => session
                .piece_drop(from, to)
                .map(|notation| CommandOutcome::Played { notation }),
            SessionCommand::RetryOracle => session
                .retry_oracle()
                .map(|issued| CommandOutcome::Retried { issued }),
            SessionCommand::DismissNotice => {
                session.dismiss_notice();
                Ok(CommandOutcome::Dismissed)
            }
        };

        result.unwrap_or_else(CommandOutcome::Refused)
    }

    #[instrument(skip(self, result))]
    fn resolve(&mut self, ticket: RequestTicket, result: Result<String, OracleError>) {
        if self.in_flight.as_ref().is_some_and(|(t, _)| *t == ticket) {
            self.in_flight = None;
        }
        match self.session.resolve_oracle(ticket, result) {
            Ok(notation) => debug!(notation = %notation, "Oracle resolution applied"),
            Err(SessionError::StaleOracleResponse) => debug!("Late oracle response ignored"),
            Err(e) => warn!(error = %e, "Oracle resolution failed"),
        }
    }

    /// Aborts the running oracle task once its ticket is no longer outstanding.
    fn cancel_stale_oracle(&mut self) {
        let outstanding = match self.session.coordinator().state() {
            CoordinatorState::AwaitingOracle { ticket } => Some(ticket),
            CoordinatorState::Idle => None,
        };
        if let Some((ticket, task)) = self.in_flight.take_if(|(t, _)| Some(*t) != outstanding) {
            debug!(?ticket, "Aborting invalidated oracle task");
            task.abort();
        }
    }

    fn dispatch_oracle(&mut self) {
        let Some(request) = self.session.take_oracle_request() else {
            return;
        };
        let Some(inbox) = self.inbox.upgrade() else {
            warn!("No handles left, oracle request dropped");
            return;
        };

        let oracle = Arc::clone(&self.oracle);
        let timeout = self.timeout;
        let ticket = request.ticket;
        info!(?ticket, oracle = %oracle.name(), "Dispatching oracle request");

        let task = tokio::spawn(async move {
            let suggestion = oracle.suggest(&request.position, request.strength);
            let result = match timeout {
                Some(limit) => tokio::time::timeout(limit, suggestion)
                    .await
                    .unwrap_or_else(|_| {
                        Err(OracleError::new(format!(
                            "No answer within {}s",
                            limit.as_secs_f32()
                        )))
                    }),
                None => suggestion.await,
            };
            if inbox
                .send(DriverMessage::OracleResolved { ticket, result })
                .is_err()
            {
                debug!(?ticket, "Driver gone, oracle result dropped");
            }
        });

        self.in_flight = Some((ticket, task));
    }

    fn publish(&self) {
        self.views.send_replace(self.session.view());
    }
}

//! Move oracles: asynchronous sources of suggested moves.

mod http;
mod local;

pub use http::HttpOracle;
pub use local::LocalOracle;

use derive_more::{Display, Error};
use tracing::{error, instrument};

/// Something that suggests a move for a position.
///
/// Suggestions are plain text. Nothing guarantees they are legal; the
/// caller re-validates against the rules engine.
#[async_trait::async_trait]
pub trait MoveOracle<P: Send + Sync>: Send + Sync {
    /// Suggests a move for `position` at the given search strength.
    async fn suggest(&self, position: &P, strength: u8) -> Result<String, OracleError>;

    /// Returns the oracle's display name.
    fn name(&self) -> &str;
}

/// Oracle failure: network error, malformed response, or no move.
#[derive(Debug, Clone, Display, Error)]
#[display("Oracle error: {} at {}:{}", message, file, line)]
pub struct OracleError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl OracleError {
    /// Creates a new oracle error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        error!(error_message = %message, "Oracle error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

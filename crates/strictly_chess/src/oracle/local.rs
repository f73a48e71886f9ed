//! In-process oracle for offline play and tests (no network).

use super::{MoveOracle, OracleError};
use crate::games::chess::RulesEngine;
use std::time::Duration;
use tracing::{debug, instrument};

/// Oracle that plays the first legal move after a short pause.
#[derive(Debug, Clone)]
pub struct LocalOracle<R> {
    name: String,
    rules: R,
    delay: Duration,
}

impl<R: RulesEngine> LocalOracle<R> {
    /// Creates a local oracle.
    pub fn new(name: impl Into<String>, rules: R) -> Self {
        Self {
            name: name.into(),
            rules,
            delay: Duration::from_millis(500),
        }
    }

    /// Sets the simulated thinking time.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait::async_trait]
impl<R> MoveOracle<R::Position> for LocalOracle<R>
where
    R: RulesEngine + 'static,
{
    #[instrument(skip(self, position), fields(oracle = %self.name))]
    async fn suggest(&self, position: &R::Position, _strength: u8) -> Result<String, OracleError> {
        // Small delay to simulate thinking
        tokio::time::sleep(self.delay).await;

        let mv = self
            .rules
            .legal_moves(position, None)
            .into_iter()
            .next()
            .ok_or_else(|| OracleError::new("No legal moves available"))?;

        debug!(mv = %mv, "Local oracle chose move");
        Ok(mv.to_string())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::chess::StandardChess;

    #[tokio::test]
    async fn test_suggests_a_legal_move() {
        let rules = StandardChess::new();
        let oracle = LocalOracle::new("Local", rules).with_delay(Duration::ZERO);
        let position = rules.initial_position();

        let text = oracle.suggest(&position, 1).await.unwrap();

        assert!(rules.parse_move(&position, &text).is_some());
    }

    #[tokio::test]
    async fn test_no_moves_is_an_error() {
        let rules = StandardChess::new();
        let oracle = LocalOracle::new("Local", rules).with_delay(Duration::ZERO);
        let mate = crate::games::chess::ChessPosition::from_fen(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        )
        .unwrap();

        assert!(oracle.suggest(&mate, 1).await.is_err());
    }
}

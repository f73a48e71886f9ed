//! Oracle backed by a remote engine over HTTP.

use super::{MoveOracle, OracleError};
use crate::games::chess::ChessPosition;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

/// Body returned by the engine endpoint.
///
/// `bestmove` is either a bare move (`e2e4`) or an engine line
/// (`bestmove e2e4 ponder e7e5`).
#[derive(Debug, Deserialize)]
struct EngineResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    bestmove: Option<String>,
    #[serde(default)]
    data: Option<String>,
}

/// Oracle that asks an HTTP engine endpoint for the best move.
///
/// Issues `GET {url}?fen=<fen>&depth=<strength>`.
#[derive(Debug, Clone)]
pub struct HttpOracle {
    url: String,
    client: reqwest::Client,
}

impl HttpOracle {
    /// Creates an oracle for the given endpoint.
    #[instrument]
    pub fn new(url: String) -> Self {
        info!("Creating HTTP oracle");
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Pulls the move token out of an engine line.
pub(crate) fn extract_move(line: &str) -> Option<&str> {
    let mut tokens = line.split_whitespace();
    let token = match tokens.next()? {
        "bestmove" => tokens.next(),
        first => Some(first),
    };
    token.filter(|token| *token != "(none)")
}

#[async_trait::async_trait]
impl MoveOracle<ChessPosition> for HttpOracle {
    #[instrument(skip(self, position), fields(url = %self.url, fen = %position.fen()))]
    async fn suggest(&self, position: &ChessPosition, strength: u8) -> Result<String, OracleError> {
        let depth = strength.to_string();
        let url = reqwest::Url::parse_with_params(
            &self.url,
            &[("fen", position.fen()), ("depth", depth.as_str())],
        )
        .map_err(|e| OracleError::new(format!("Invalid oracle URL: {}", e)))?;

        debug!("Sending request to oracle");
        let response = self.client.get(url).send().await.map_err(|e| {
            error!(error = ?e, "Oracle request failed");
            OracleError::new(format!("Oracle request failed: {}", e))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read oracle response");
            OracleError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %body, "Oracle HTTP error");
            return Err(OracleError::new(format!(
                "Oracle HTTP error {}: {}",
                status, body
            )));
        }

        let parsed: EngineResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = ?e, response = %body, "Failed to parse oracle response");
            OracleError::new(format!("Failed to parse response: {}", e))
        })?;

        if parsed.success == Some(false) {
            let reason = parsed.data.unwrap_or_else(|| "unknown reason".to_string());
            return Err(OracleError::new(format!("Oracle declined: {}", reason)));
        }

        let line = parsed
            .bestmove
            .ok_or_else(|| OracleError::new("No bestmove in oracle response"))?;
        let mv = extract_move(&line)
            .ok_or_else(|| OracleError::new(format!("Oracle returned no move: '{}'", line)))?;

        info!(suggestion = %mv, "Oracle suggested move");
        Ok(mv.to_string())
    }

    fn name(&self) -> &str {
        "HTTP engine"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_move_from_engine_line() {
        assert_eq!(extract_move("bestmove e2e4 ponder e7e5"), Some("e2e4"));
        assert_eq!(extract_move("e7e8q"), Some("e7e8q"));
    }

    #[test]
    fn test_extract_move_rejects_empty() {
        assert_eq!(extract_move(""), None);
        assert_eq!(extract_move("bestmove"), None);
        assert_eq!(extract_move("bestmove (none)"), None);
    }

    #[test]
    fn test_response_parses_without_optional_fields() {
        let parsed: EngineResponse =
            serde_json::from_str(r#"{"bestmove": "bestmove g1f3 ponder g8f6"}"#).unwrap();
        assert_eq!(parsed.success, None);
        assert_eq!(parsed.bestmove.as_deref().and_then(extract_move), Some("g1f3"));
    }
}

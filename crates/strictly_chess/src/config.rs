//! Session configuration loaded from TOML.

use crate::games::chess::Side;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Environment variable overriding [`SessionConfig::oracle_url`].
pub const ORACLE_URL_ENV: &str = "STRICTLY_CHESS_ORACLE_URL";

/// Which oracle backs the session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::EnumString, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OracleKind {
    /// Remote engine over HTTP.
    Http,
    /// In-process first-legal-move player.
    Local,
}

/// Configuration for a chess session.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Oracle backend.
    #[serde(default = "default_oracle")]
    oracle: OracleKind,

    /// Engine endpoint for the HTTP oracle.
    #[serde(default = "default_oracle_url")]
    oracle_url: String,

    /// Search depth passed to the oracle.
    #[serde(default = "default_strength")]
    strength: u8,

    /// Seconds before an oracle request fails; 0 disables the timeout.
    #[serde(default = "default_oracle_timeout_secs")]
    oracle_timeout_secs: u64,

    /// Side the human plays.
    #[serde(default = "default_manual_side")]
    manual_side: Side,

    /// Log destination for the console front end.
    #[serde(default = "default_log_file")]
    log_file: PathBuf,
}

#[instrument]
fn default_oracle() -> OracleKind {
    OracleKind::Http
}

#[instrument]
fn default_oracle_url() -> String {
    "https://stockfish.online/api/s/v2.php".to_string()
}

#[instrument]
fn default_strength() -> u8 {
    10
}

#[instrument]
fn default_oracle_timeout_secs() -> u64 {
    30
}

#[instrument]
fn default_manual_side() -> Side {
    Side::First
}

#[instrument]
fn default_log_file() -> PathBuf {
    PathBuf::from("strictly_chess.log")
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            oracle: default_oracle(),
            oracle_url: default_oracle_url(),
            strength: default_strength(),
            oracle_timeout_secs: default_oracle_timeout_secs(),
            manual_side: default_manual_side(),
            log_file: default_log_file(),
        }
    }
}

impl SessionConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(oracle = %config.oracle, strength = config.strength, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise defaults, then applies the
    /// environment override.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = if path.as_ref().exists() {
            Self::from_file(path)?
        } else {
            debug!("No config file, using defaults");
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    /// Applies `STRICTLY_CHESS_ORACLE_URL` if set.
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(ORACLE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => {
                debug!(url = %url, "Oracle URL overridden from environment");
                self.with_oracle_url(url)
            }
            _ => self,
        }
    }

    /// Side played by the oracle.
    pub fn oracle_side(&self) -> Side {
        self.manual_side.opponent()
    }

    /// Oracle timeout, `None` when disabled.
    pub fn oracle_timeout(&self) -> Option<Duration> {
        (self.oracle_timeout_secs > 0).then(|| Duration::from_secs(self.oracle_timeout_secs))
    }

    /// Replaces the oracle backend.
    pub fn with_oracle(mut self, oracle: OracleKind) -> Self {
        self.oracle = oracle;
        self
    }

    /// Replaces the oracle URL.
    pub fn with_oracle_url(mut self, url: impl Into<String>) -> Self {
        self.oracle_url = url.into();
        self
    }

    /// Replaces the strength.
    pub fn with_strength(mut self, strength: u8) -> Self {
        self.strength = strength;
        self
    }

    /// Replaces the manual side.
    pub fn with_manual_side(mut self, side: Side) -> Self {
        self.manual_side = side;
        self
    }

    /// Replaces the log file.
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = path.into();
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

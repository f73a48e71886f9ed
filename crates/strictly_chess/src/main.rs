//! Strictly Chess - Unified CLI
//!
//! Play chess against a move oracle from the terminal.

#![warn(missing_docs)]

mod cli;
mod console;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::{Path, PathBuf};
use strictly_chess::{ChessPosition, OracleKind, SessionConfig, Side};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            oracle,
            oracle_url,
            strength,
            side,
            fen,
            log_file,
        } => {
            let config = load_config(cli.config, oracle, oracle_url, strength, side, log_file)?;
            run_play(config, fen).await
        }
        Command::Fen => {
            println!("{}", ChessPosition::initial());
            Ok(())
        }
    }
}

/// Loads the config file and applies command-line overrides.
#[instrument(skip_all, fields(path = %path.display()))]
fn load_config(
    path: PathBuf,
    oracle: Option<OracleKind>,
    oracle_url: Option<String>,
    strength: Option<u8>,
    side: Option<Side>,
    log_file: Option<PathBuf>,
) -> Result<SessionConfig> {
    let mut config = SessionConfig::load(&path)?;
    if let Some(oracle) = oracle {
        config = config.with_oracle(oracle);
    }
    if let Some(url) = oracle_url {
        config = config.with_oracle_url(url);
    }
    if let Some(strength) = strength {
        config = config.with_strength(strength);
    }
    if let Some(side) = side {
        config = config.with_manual_side(side);
    }
    if let Some(log_file) = log_file {
        config = config.with_log_file(log_file);
    }
    Ok(config)
}

/// Run the console game
async fn run_play(config: SessionConfig, fen: Option<String>) -> Result<()> {
    init_file_logging(config.log_file())?;

    info!(?config, "Starting Strictly Chess");

    let start = fen.as_deref().map(ChessPosition::from_fen).transpose()?;
    console::run_console(config, start).await
}

/// Routes tracing to `path` so output doesn't interleave with the board.
///
/// Returns `false` when a global subscriber was already installed.
fn init_file_logging(path: &Path) -> Result<bool> {
    let log_file = std::fs::File::create(path)?;
    match tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,strictly_chess=debug")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Ok(true),
        Err(e) => {
            eprintln!("Logging to {} disabled: {}", path.display(), e);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_logging_init_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        init_file_logging(&dir.path().join("first.log")).unwrap();

        let installed = init_file_logging(&dir.path().join("second.log")).unwrap();
        assert!(!installed);
        assert!(dir.path().join("second.log").exists());
    }

    #[test]
    fn test_unwritable_log_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(init_file_logging(&dir.path().join("missing/dir/game.log")).is_err());
    }
}

//! Command-line interface for strictly_chess.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strictly_chess::{OracleKind, Side};

/// Strictly Chess - play chess against a move oracle
#[derive(Parser, Debug)]
#[command(name = "strictly_chess")]
#[command(about = "Chess session manager with a pluggable move oracle", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the session config (defaults are used if it doesn't exist)
    #[arg(short, long, default_value = "strictly_chess.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play in the console
    Play {
        /// Oracle backend (http or local)
        #[arg(long)]
        oracle: Option<OracleKind>,

        /// Engine endpoint for the http oracle
        #[arg(long)]
        oracle_url: Option<String>,

        /// Search depth passed to the oracle
        #[arg(short, long)]
        strength: Option<u8>,

        /// Side you play (white or black)
        #[arg(long)]
        side: Option<Side>,

        /// Start from this FEN instead of the initial position
        #[arg(long)]
        fen: Option<String>,

        /// Log file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Print the FEN of the initial position
    Fen,
}

//! Line-oriented console front end.

mod input;
mod render;

use anyhow::Result;
use input::{ConsoleInput, HELP, parse_line};
use render::render;
use std::io::Write;
use std::sync::Arc;
use strictly_chess::{
    ChessPosition, CommandOutcome, GameSession, HttpOracle, LocalOracle, MoveOracle, OracleKind,
    RulesEngine, SessionConfig, SessionDriver, SessionHandle, Side, StandardChess,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument};

/// Runs an interactive game until the user quits or stdin closes.
#[instrument(skip_all, fields(oracle = %config.oracle(), manual_side = %config.manual_side()))]
pub async fn run_console(config: SessionConfig, start: Option<ChessPosition>) -> Result<()> {
    let rules = StandardChess::new();
    let oracle: Arc<dyn MoveOracle<ChessPosition>> = match config.oracle() {
        OracleKind::Http => {
            let http = HttpOracle::new(config.oracle_url().clone());
            info!(url = %http.url(), "Using HTTP oracle");
            Arc::new(http)
        }
        OracleKind::Local => Arc::new(LocalOracle::new("Local", rules)),
    };
    info!(oracle = %oracle.name(), "Starting console session");

    let mut session = GameSession::new(rules, *config.strength());
    match start {
        Some(position) => session.start_from_position(config.oracle_side(), position),
        None => session.start_new_game(config.oracle_side()),
    }

    let (handle, driver) = SessionDriver::spawn(session, oracle, config.oracle_timeout());

    println!("Strictly Chess - type 'help' for commands");
    let result = interact(
        &rules,
        &handle,
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
        *config.manual_side(),
    )
    .await;

    handle.shutdown();
    driver.await?;
    info!("Console session ended");
    result
}

/// Reads commands and redraws on every published view.
///
/// Input is read while the oracle is thinking, so navigation, new game and
/// change side stay available when the oracle stalls.
async fn interact<R, I, W>(
    rules: &R,
    handle: &SessionHandle<R::Position>,
    input: I,
    mut out: W,
    default_manual_side: Side,
) -> Result<()>
where
    R: RulesEngine,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut views = handle.subscribe();
    let mut redraw = true;

    loop {
        if redraw {
            let view = views.borrow_and_update().clone();
            write!(out, "\n{}> ", render(rules, &view))?;
            out.flush()?;
        }

        redraw = tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    debug!("Driver stopped");
                    break;
                }
                true
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                let manual_side = views
                    .borrow()
                    .oracle_side
                    .map(Side::opponent)
                    .unwrap_or(default_manual_side);

                match parse_line(&line, manual_side) {
                    Ok(ConsoleInput::Quit) => break,
                    Ok(ConsoleInput::Help) => writeln!(out, "{}", HELP)?,
                    Ok(ConsoleInput::Show) => {}
                    Ok(ConsoleInput::Command(command)) => match handle.send(command).await? {
                        // The notice banner carries the message.
                        CommandOutcome::Refused(error) => debug!(error = %error, "Command refused"),
                        outcome => debug!(?outcome, "Command applied"),
                    },
                    Err(message) => writeln!(out, "{}", message)?,
                }
                true
            }
        };
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_chess::OracleError;

    /// Oracle that never answers.
    struct StalledOracle;

    #[async_trait::async_trait]
    impl MoveOracle<ChessPosition> for StalledOracle {
        async fn suggest(&self, _position: &ChessPosition, _strength: u8) -> Result<String, OracleError> {
            std::future::pending().await
        }

        fn name(&self) -> &str {
            "stalled"
        }
    }

    #[tokio::test]
    async fn test_commands_accepted_while_oracle_stalls() {
        let rules = StandardChess::new();
        let mut session = GameSession::new(rules, 4);
        session.start_new_game(Side::First);
        let (handle, driver) = SessionDriver::spawn(session, Arc::new(StalledOracle), None);
        assert!(handle.view().is_analyzing());

        let script: &[u8] = b"back\nnew white\nquit\n";
        let mut out = Vec::new();
        interact(&rules, &handle, script, &mut out, Side::Second)
            .await
            .unwrap();

        let view = handle.view();
        assert!(!view.is_analyzing());
        assert_eq!(view.oracle_side, Some(Side::Second));
        assert!(String::from_utf8(out).unwrap().contains("Analyzing..."));

        handle.shutdown();
        driver.await.unwrap();
    }

    #[tokio::test]
    async fn test_input_end_stops_loop() {
        let rules = StandardChess::new();
        let mut session = GameSession::new(rules, 4);
        session.start_new_game(Side::First);
        let (handle, driver) = SessionDriver::spawn(session, Arc::new(StalledOracle), None);

        let script: &[u8] = b"";
        interact(&rules, &handle, script, Vec::new(), Side::Second)
            .await
            .unwrap();

        handle.shutdown();
        driver.await.unwrap();
    }
}

//! Parsing console lines into session commands.

use strictly_chess::{Direction, SessionCommand, Side, Square};

/// What the user typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleInput {
    /// Forward to the driver.
    Command(SessionCommand),
    /// Redraw the board.
    Show,
    /// Print the command list.
    Help,
    /// Leave.
    Quit,
}

/// Help text for the prompt.
pub const HELP: &str = "\
Commands:
  e2          click a square (select, deselect, or move the selection)
  e2e4, e2 e4 move a piece directly
  new [white|black]  start a new game playing the given side
  side        swap sides and restart
  flip        flip the board
  undo        take back your last move
  back, <     step back through history
  forward, >  step forward through history
  retry       ask the oracle again after a failure
  dismiss     clear the notice
  show        redraw the board
  help        this text
  quit";

/// Parses one line. `manual_side` is the side a bare `new` plays.
pub fn parse_line(line: &str, manual_side: Side) -> Result<ConsoleInput, String> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(ConsoleInput::Show);
    };
    let second = words.next();

    let command = match (first.to_ascii_lowercase().as_str(), second) {
        ("quit" | "exit" | "q", None) => return Ok(ConsoleInput::Quit),
        ("help" | "?", None) => return Ok(ConsoleInput::Help),
        ("show", None) => return Ok(ConsoleInput::Show),
        ("new", side) => {
            let manual = match side {
                Some(text) => text
                    .to_ascii_lowercase()
                    .parse::<Side>()
                    .map_err(|_| format!("Unknown side '{}'", text))?,
                None => manual_side,
            };
            SessionCommand::NewGame(manual.opponent())
        }
        ("side", None) => SessionCommand::ChangeSide,
        ("flip", None) => SessionCommand::FlipBoard,
        ("undo", None) => SessionCommand::Undo,
        ("back" | "<", None) => SessionCommand::Navigate(Direction::Back),
        ("forward" | ">", None) => SessionCommand::Navigate(Direction::Forward),
        ("retry", None) => SessionCommand::RetryOracle,
        ("dismiss", None) => SessionCommand::DismissNotice,
        (text, Some(to)) => SessionCommand::PieceDrop {
            from: parse_square(text)?,
            to: parse_square(to)?,
        },
        (text, None) if text.len() == 4 && text.is_ascii() => SessionCommand::PieceDrop {
            from: parse_square(&text[..2])?,
            to: parse_square(&text[2..])?,
        },
        (text, None) => SessionCommand::SquareClick(parse_square(text)?),
    };
    Ok(ConsoleInput::Command(command))
}

fn parse_square(text: &str) -> Result<Square, String> {
    text.parse::<Square>()
        .map_err(|_| format!("'{}' is not a square or command (try 'help')", text))
}

//! Stateless text rendering of a session view.

use std::fmt::Write;
use strictly_chess::{RulesEngine, SessionView, Side, Square};

/// Renders the board, banners and move table.
pub fn render<R: RulesEngine>(rules: &R, view: &SessionView<R::Position>) -> String {
    let mut out = String::new();
    draw_board(&mut out, rules, view);
    draw_status(&mut out, view);
    draw_moves(&mut out, view);
    out
}

fn draw_board<R: RulesEngine>(out: &mut String, rules: &R, view: &SessionView<R::Position>) {
    let (ranks, files): (Vec<u8>, Vec<u8>) = match view.orientation {
        Side::First => ((0..8).rev().collect(), (0..8).collect()),
        Side::Second => ((0..8).collect(), (0..8).rev().collect()),
    };

    for &rank in &ranks {
        let _ = write!(out, "{} ", rank + 1);
        for &file in &files {
            let Some(square) = Square::from_coords(file, rank) else {
                continue;
            };
            let symbol = rules
                .piece_at(&view.position, square)
                .map(|piece| piece.symbol())
                .unwrap_or('.');
            let cell = if view.selected == Some(square) {
                format!("[{}]", symbol)
            } else if view.highlighted.contains(&square) {
                format!("*{} ", symbol)
            } else {
                format!(" {} ", symbol)
            };
            out.push_str(&cell);
        }
        out.push('\n');
    }

    out.push_str("  ");
    for &file in &files {
        let _ = write!(out, " {} ", char::from(b'a' + file));
    }
    out.push('\n');
}

fn draw_status<P>(out: &mut String, view: &SessionView<P>) {
    let you = view
        .oracle_side
        .map(|side| side.opponent().label())
        .unwrap_or("-");
    let _ = writeln!(
        out,
        "You: {}  To move: {}  Position {}{}",
        you,
        view.turn.label(),
        view.counter(),
        if view.live { "" } else { " (history)" }
    );
    for banner in &view.banners {
        let _ = writeln!(out, "! {}", banner);
    }
}

fn draw_moves<P>(out: &mut String, view: &SessionView<P>) {
    if view.move_pairs.is_empty() {
        return;
    }
    let line = view
        .move_pairs
        .iter()
        .map(|pair| match &pair.second {
            Some(second) => format!("{}. {} {}", pair.number, pair.first, second),
            None => format!("{}. {}", pair.number, pair.first),
        })
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_chess::{GameSession, StandardChess};

    #[test]
    fn test_initial_board_white_at_bottom() {
        let mut session = GameSession::new(StandardChess::new(), 5);
        session.start_new_game(Side::Second);
        let text = render(session.rules(), &session.view());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8  r  n  b  q  k  b  n  r ");
        assert_eq!(lines[7], "1  R  N  B  Q  K  B  N  R ");
        assert!(lines[8].starts_with("   a "));
    }

    #[test]
    fn test_flipped_board_black_at_bottom() {
        let mut session = GameSession::new(StandardChess::new(), 5);
        session.start_new_game(Side::First);
        let text = render(session.rules(), &session.view());
        assert!(text.lines().next().unwrap_or_default().starts_with("1  R  N  B  K"));
    }

    #[test]
    fn test_selection_is_bracketed() {
        let mut session = GameSession::new(StandardChess::new(), 5);
        session.start_new_game(Side::Second);
        session.square_click("e2".parse().unwrap()).unwrap();
        let text = render(session.rules(), &session.view());
        assert!(text.contains("[P]"));
        assert!(text.contains("*. "));
    }
}

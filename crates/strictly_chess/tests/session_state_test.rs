//! Tests for session state: history, move log, cursor and terminal status.

use strictly_chess::{
    ChessPosition, Direction, DrawReason, GameStatus, Move, RulesEngine, SessionChecks,
    SessionError, SessionState, Side, StandardChess, StateChecks,
};

fn mv(text: &str) -> Move {
    text.parse().expect("valid coordinate move")
}

fn started() -> (StandardChess, SessionState<ChessPosition>) {
    let rules = StandardChess::new();
    let mut state = SessionState::idle(rules.initial_position());
    state.reset(rules.initial_position(), Side::Second);
    (rules, state)
}

#[test]
fn test_idle_state_refuses_moves() {
    let rules = StandardChess::new();
    let mut state = SessionState::idle(rules.initial_position());

    assert_eq!(state.oracle_side(), None);
    assert_eq!(state.apply_move(&rules, &mv("e2e4")), Err(SessionError::NoActiveGame));
    assert_eq!(state.history().len(), 1);
}

#[test]
fn test_reset_starts_fresh_game() {
    let (rules, mut state) = started();
    state.apply_move(&rules, &mv("e2e4")).expect("legal");
    let generation = state.generation();

    state.reset(rules.initial_position(), Side::First);

    assert_eq!(state.history().len(), 1);
    assert!(state.move_log().is_empty());
    assert_eq!(state.cursor(), 0);
    assert_eq!(state.oracle_side(), Some(Side::First));
    assert_eq!(state.manual_side(), Some(Side::Second));
    assert!(state.generation() > generation);
}

#[test]
fn test_moves_extend_history_and_log() {
    let (rules, mut state) = started();

    assert_eq!(state.apply_move(&rules, &mv("e2e4")), Ok("e4".to_string()));
    assert_eq!(state.apply_move(&rules, &mv("e7e5")), Ok("e5".to_string()));
    assert_eq!(state.apply_move(&rules, &mv("g1f3")), Ok("Nf3".to_string()));

    assert_eq!(state.history().len(), 4);
    assert_eq!(state.move_log(), ["e4", "e5", "Nf3"]);
    assert_eq!(state.cursor(), 3);
    assert!(state.is_live_view());
    assert_eq!(rules.turn_to_move(state.live_position()), Side::Second);
    assert!(SessionChecks::failures(&state).is_empty());
}

#[test]
fn test_illegal_move_leaves_state_untouched() {
    let (rules, mut state) = started();
    let generation = state.generation();

    let result = state.apply_move(&rules, &mv("e2e5"));

    assert_eq!(result, Err(SessionError::IllegalMove(mv("e2e5"))));
    assert_eq!(state.history().len(), 1);
    assert!(state.move_log().is_empty());
    assert_eq!(state.generation(), generation);
}

#[test]
fn test_navigation_round_trip() {
    let (rules, mut state) = started();
    for text in ["e2e4", "e7e5", "g1f3", "b8c6"] {
        state.apply_move(&rules, &mv(text)).expect("legal");
    }
    let history = state.history().to_vec();

    assert!(state.navigate(Direction::Back));
    assert!(state.navigate(Direction::Back));
    assert_eq!(state.cursor(), 2);
    assert_eq!(state.displayed_position(), &history[2]);
    assert!(!state.is_live_view());

    assert!(state.navigate(Direction::Forward));
    assert!(state.navigate(Direction::Forward));
    assert_eq!(state.cursor(), 4);
    assert_eq!(state.displayed_position(), state.live_position());
    assert_eq!(state.history(), history.as_slice());
}

#[test]
fn test_navigation_clamps_at_bounds() {
    let (rules, mut state) = started();
    state.apply_move(&rules, &mv("e2e4")).expect("legal");

    assert!(!state.navigate(Direction::Forward));
    assert!(state.navigate(Direction::Back));
    assert!(!state.navigate(Direction::Back));
    assert_eq!(state.cursor(), 0);
}

#[test]
fn test_move_applies_to_live_position_while_browsing() {
    let (rules, mut state) = started();
    state.apply_move(&rules, &mv("e2e4")).expect("legal");
    state.apply_move(&rules, &mv("e7e5")).expect("legal");
    state.navigate(Direction::Back);
    state.navigate(Direction::Back);

    // Legal only from the live position.
    assert_eq!(state.apply_move(&rules, &mv("g1f3")), Ok("Nf3".to_string()));
    assert_eq!(state.cursor(), 3);
}

#[test]
fn test_threefold_repetition_is_a_draw() {
    let (rules, mut state) = started();
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];

    for text in shuffle {
        state.apply_move(&rules, &mv(text)).expect("legal");
    }
    assert_eq!(state.status(&rules), GameStatus::InProgress);

    for text in shuffle {
        state.apply_move(&rules, &mv(text)).expect("legal");
    }
    assert_eq!(state.status(&rules), GameStatus::Draw(DrawReason::Repetition));
    assert_eq!(state.apply_move(&rules, &mv("e2e4")), Err(SessionError::GameOver));
}

#[test]
fn test_fifty_move_rule_from_fen() {
    let rules = StandardChess::new();
    let position =
        ChessPosition::from_fen("8/8/8/4k3/8/8/4K3/4R3 w - - 100 80").expect("valid FEN");
    let mut state = SessionState::idle(rules.initial_position());
    state.reset(position, Side::Second);

    assert_eq!(state.status(&rules), GameStatus::Draw(DrawReason::FiftyMoveRule));
}

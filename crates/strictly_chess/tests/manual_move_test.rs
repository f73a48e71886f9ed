//! Tests for manual input: eligibility, legality, click selection and undo.

use strictly_chess::{
    ChessPosition, ClickOutcome, GameSession, ManualMoveValidator, Move, OracleError, PieceKind,
    RulesEngine, Selection, SessionError, Side, Square, StandardChess,
};

fn sq(text: &str) -> Square {
    text.parse().expect("valid square")
}

/// Human plays white; the oracle answers as black.
fn human_white() -> GameSession<StandardChess> {
    let mut session = GameSession::new(StandardChess::new(), 8);
    session.start_new_game(Side::Second);
    session
}

/// Human plays black; the oracle's first request is still outstanding.
fn human_black() -> GameSession<StandardChess> {
    let mut session = GameSession::new(StandardChess::new(), 8);
    session.start_new_game(Side::First);
    session
}

#[test]
fn test_no_game_refuses_input() {
    let mut session = GameSession::new(StandardChess::new(), 8);

    assert_eq!(session.square_click(sq("e2")), Err(SessionError::NoActiveGame));
    assert_eq!(
        session.piece_drop(sq("e2"), sq("e4")),
        Err(SessionError::NoActiveGame)
    );
    assert_eq!(session.undo_last_manual_move(), Err(SessionError::NoActiveGame));
    assert_eq!(session.change_side(), Err(SessionError::NoActiveGame));
    assert!(session.notice().is_some());
}

#[test]
fn test_touching_oracle_piece_is_wrong_color() {
    let mut session = human_white();

    assert_eq!(
        session.square_click(sq("e7")),
        Err(SessionError::WrongPieceColor(sq("e7")))
    );
    assert_eq!(
        session.piece_drop(sq("e7"), sq("e5")),
        Err(SessionError::WrongPieceColor(sq("e7")))
    );
    assert_eq!(session.selection(), &Selection::Unselected);
}

#[test]
fn test_empty_origin_is_rejected() {
    let mut session = human_white();
    assert_eq!(
        session.square_click(sq("e4")),
        Err(SessionError::NoPieceAtSource(sq("e4")))
    );
}

#[test]
fn test_input_locked_while_analyzing() {
    let mut session = human_black();

    assert_eq!(
        session.piece_drop(sq("e7"), sq("e5")),
        Err(SessionError::AnalysisInProgress)
    );
    assert_eq!(session.square_click(sq("e7")), Err(SessionError::AnalysisInProgress));
    assert_eq!(session.state().history().len(), 1);
    assert_eq!(session.view().notice(), Some("Analysis in progress, please wait"));
}

#[test]
fn test_wrong_turn_after_oracle_failure() {
    let mut session = human_black();
    let ticket = session.take_oracle_request().expect("request").ticket;
    let _ = session.resolve_oracle(ticket, Err(OracleError::new("timeout")));

    assert_eq!(
        session.piece_drop(sq("e7"), sq("e5")),
        Err(SessionError::WrongTurn)
    );
}

#[test]
fn test_illegal_destination_leaves_history_unchanged() {
    let mut session = human_white();

    assert_eq!(
        session.piece_drop(sq("e2"), sq("e5")),
        Err(SessionError::IllegalMove(Move::new(sq("e2"), sq("e5"))))
    );
    assert_eq!(session.state().history().len(), 1);
    assert!(!session.coordinator().is_awaiting());
}

#[test]
fn test_legal_drop_hands_turn_to_oracle() {
    let mut session = human_white();

    assert_eq!(session.piece_drop(sq("e2"), sq("e4")), Ok("e4".to_string()));
    assert!(session.coordinator().is_awaiting());
    let request = session.take_oracle_request().expect("request");
    assert_eq!(request.position, *session.state().live_position());
}

#[test]
fn test_click_select_and_deselect() {
    let mut session = human_white();

    assert_eq!(
        session.square_click(sq("e2")),
        Ok(ClickOutcome::Selected { origin: sq("e2") })
    );
    assert_eq!(session.view().highlighted, vec![sq("e2"), sq("e3"), sq("e4")]);

    assert_eq!(session.square_click(sq("e2")), Ok(ClickOutcome::Deselected));
    assert!(session.view().highlighted.is_empty());
}

#[test]
fn test_click_to_move() {
    let mut session = human_white();

    session.square_click(sq("g1")).expect("own piece");
    assert_eq!(
        session.square_click(sq("f3")),
        Ok(ClickOutcome::Moved {
            notation: "Nf3".to_string()
        })
    );
    assert_eq!(session.selection(), &Selection::Unselected);
    assert!(session.coordinator().is_awaiting());
}

#[test]
fn test_click_on_other_own_piece_reselects() {
    let mut session = human_white();

    session.square_click(sq("e2")).expect("own piece");
    assert_eq!(
        session.square_click(sq("g1")),
        Ok(ClickOutcome::Reselected { origin: sq("g1") })
    );
    assert_eq!(session.selection().origin(), Some(sq("g1")));
    assert!(session.notice().is_none());
}

#[test]
fn test_failed_click_clears_selection() {
    let mut session = human_white();

    session.square_click(sq("e2")).expect("own piece");
    assert_eq!(
        session.square_click(sq("e5")),
        Err(SessionError::IllegalMove(Move::new(sq("e2"), sq("e5"))))
    );
    assert_eq!(session.selection(), &Selection::Unselected);
    assert_eq!(session.state().history().len(), 1);
}

#[test]
fn test_promotion_defaults_to_queen() {
    let rules = StandardChess::new();
    let mut session = GameSession::new(rules, 8);
    let position = ChessPosition::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").expect("valid FEN");
    session.start_from_position(Side::Second, position);

    assert_eq!(
        ManualMoveValidator::validate(&rules, session.state(), false, sq("e7"), sq("e8")),
        Ok(Move::with_promotion(sq("e7"), sq("e8"), PieceKind::Queen))
    );
    let notation = session.piece_drop(sq("e7"), sq("e8")).expect("legal");

    assert!(notation.starts_with("e8=Q"));
    let piece = rules
        .piece_at(session.state().live_position(), sq("e8"))
        .expect("promoted piece");
    assert_eq!(piece.kind, PieceKind::Queen);
    assert_eq!(piece.side, Side::First);
}

#[test]
fn test_undo_requires_manual_last_move() {
    let mut session = human_white();
    assert_eq!(session.undo_last_manual_move(), Err(SessionError::NothingToUndo));

    session.piece_drop(sq("e2"), sq("e4")).expect("legal");
    assert_eq!(
        session.undo_last_manual_move(),
        Err(SessionError::AnalysisInProgress)
    );

    let ticket = session.take_oracle_request().expect("request").ticket;
    session
        .resolve_oracle(ticket, Ok("e7e5".to_string()))
        .expect("legal");
    assert_eq!(session.undo_last_manual_move(), Err(SessionError::NothingToUndo));
    assert_eq!(session.state().move_log(), ["e4", "e5"]);
}

#[test]
fn test_undo_after_oracle_failure() {
    let mut session = human_white();
    session.piece_drop(sq("e2"), sq("e4")).expect("legal");
    let ticket = session.take_oracle_request().expect("request").ticket;
    let _ = session.resolve_oracle(ticket, Err(OracleError::new("unreachable")));

    assert_eq!(session.undo_last_manual_move(), Ok("e4".to_string()));
    assert_eq!(session.state().history().len(), 1);
    assert!(session.state().move_log().is_empty());
    assert!(!session.coordinator().is_awaiting());
    assert!(session.notice().is_none());
}

#[test]
fn test_change_side_restarts_with_oracle_to_move() {
    let mut session = human_white();
    session.piece_drop(sq("e2"), sq("e4")).expect("legal");

    assert_eq!(session.change_side(), Ok(Side::First));
    assert_eq!(session.state().history().len(), 1);
    assert_eq!(session.state().manual_side(), Some(Side::Second));
    assert_eq!(session.orientation(), Side::Second);
    assert!(session.coordinator().is_awaiting());
}

#[test]
fn test_flip_orientation_is_display_only() {
    let mut session = human_white();
    let generation = session.state().generation();

    assert_eq!(session.flip_orientation(), Side::Second);
    assert_eq!(session.flip_orientation(), Side::First);
    assert_eq!(session.state().generation(), generation);
}

#[test]
fn test_dismiss_notice() {
    let mut session = human_white();
    let _ = session.square_click(sq("e7"));
    assert!(session.notice().is_some());

    session.dismiss_notice();
    assert!(session.notice().is_none());
}

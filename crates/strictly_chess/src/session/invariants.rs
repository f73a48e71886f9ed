//! Structural checks on [`SessionState`], run after every history change.
//!
//! Each check is a zero-sized type so a set of them is just a tuple type.
//! Failures are logged and trip a debug assertion; release builds continue.

use super::state::SessionState;
use derive_more::Display;
use tracing::warn;

/// A property of `S` that every reachable state satisfies.
pub trait StateCheck<S> {
    /// Name used in logs.
    const NAME: &'static str;

    /// Whether `state` satisfies the property.
    fn passes(state: &S) -> bool;
}

/// A check that did not pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("{}", name)]
pub struct CheckFailure {
    /// [`StateCheck::NAME`] of the failed check.
    pub name: &'static str,
}

/// Several checks evaluated together.
pub trait StateChecks<S> {
    /// Every failing check, empty when the state is sound.
    fn failures(state: &S) -> Vec<CheckFailure>;
}

impl<S, A, B> StateChecks<S> for (A, B)
where
    A: StateCheck<S>,
    B: StateCheck<S>,
{
    fn failures(state: &S) -> Vec<CheckFailure> {
        [(A::NAME, A::passes(state)), (B::NAME, B::passes(state))]
            .into_iter()
            .filter(|(_, passed)| !passed)
            .map(|(name, _)| CheckFailure { name })
            .collect()
    }
}

/// `move_log.len() == history.len() - 1`, with history never empty.
pub struct MoveLogParallel;

impl<P: Clone + std::fmt::Debug> StateCheck<SessionState<P>> for MoveLogParallel {
    const NAME: &'static str = "move log parallel to history[1..]";

    fn passes(state: &SessionState<P>) -> bool {
        !state.history().is_empty() && state.move_log().len() == state.history().len() - 1
    }
}

/// The cursor points into history.
pub struct CursorInBounds;

impl<P: Clone + std::fmt::Debug> StateCheck<SessionState<P>> for CursorInBounds {
    const NAME: &'static str = "cursor within history";

    fn passes(state: &SessionState<P>) -> bool {
        state.cursor() < state.history().len()
    }
}

/// Checks run on every session state.
pub type SessionChecks = (MoveLogParallel, CursorInBounds);

/// Logs each failing [`SessionChecks`] entry; panics in debug builds.
pub fn verify_session<P: Clone + std::fmt::Debug>(state: &SessionState<P>) {
    let failures = SessionChecks::failures(state);
    if failures.is_empty() {
        return;
    }
    for failure in &failures {
        warn!(check = %failure, cursor = state.cursor(), "Session state check failed");
    }
    debug_assert!(false, "Session state checks failed: {:?}", failures);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::chess::{Move, RulesEngine, Side, StandardChess};
    use crate::session::state::Direction;

    #[test]
    fn test_fresh_state_passes() {
        let state = SessionState::idle(StandardChess.initial_position());
        assert!(SessionChecks::failures(&state).is_empty());
    }

    #[test]
    fn test_passes_after_moves_and_navigation() {
        let rules = StandardChess::new();
        let mut state = SessionState::idle(rules.initial_position());
        state.reset(rules.initial_position(), Side::Second);

        let e4 = Move::new("e2".parse().unwrap(), "e4".parse().unwrap());
        state.apply_move(&rules, &e4).unwrap();
        assert!(MoveLogParallel::passes(&state));

        state.navigate(Direction::Back);
        state.navigate(Direction::Back);
        assert!(CursorInBounds::passes(&state));
        assert_eq!(state.cursor(), 0);
    }

    struct AlwaysFails;

    impl StateCheck<u8> for AlwaysFails {
        const NAME: &'static str = "always fails";

        fn passes(_: &u8) -> bool {
            false
        }
    }

    struct NonZero;

    impl StateCheck<u8> for NonZero {
        const NAME: &'static str = "non-zero";

        fn passes(state: &u8) -> bool {
            *state != 0
        }
    }

    #[test]
    fn test_failures_name_each_failing_check() {
        assert_eq!(
            <(AlwaysFails, NonZero)>::failures(&0),
            vec![
                CheckFailure {
                    name: "always fails"
                },
                CheckFailure { name: "non-zero" }
            ]
        );
        assert_eq!(
            <(AlwaysFails, NonZero)>::failures(&1),
            vec![CheckFailure {
                name: "always fails"
            }]
        );
    }
}

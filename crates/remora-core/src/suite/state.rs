//! The per-kind harness state machine.
//!
//! Enforces the valid transition graph:
//!
//! ```text
//! Pending             -> ProgrammaticRunning
//! ProgrammaticRunning -> DeclarativeRunning
//! ProgrammaticRunning -> Reported   (run error)
//! DeclarativeRunning  -> Compared
//! DeclarativeRunning  -> Reported   (run error, or either artifact missing)
//! Compared            -> Reported
//! ```
//!
//! Reported is terminal; there is no retry edge.

use std::fmt;

/// Lifecycle of one hook kind's harness run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessState {
    Pending,
    ProgrammaticRunning,
    DeclarativeRunning,
    Compared,
    Reported,
}

impl HarnessState {
    /// Check whether a transition from `from` to `to` is a valid edge in
    /// the state graph.
    pub fn is_valid_transition(from: HarnessState, to: HarnessState) -> bool {
        matches!(
            (from, to),
            (HarnessState::Pending, HarnessState::ProgrammaticRunning)
                | (HarnessState::ProgrammaticRunning, HarnessState::DeclarativeRunning)
                | (HarnessState::ProgrammaticRunning, HarnessState::Reported)
                | (HarnessState::DeclarativeRunning, HarnessState::Compared)
                | (HarnessState::DeclarativeRunning, HarnessState::Reported)
                | (HarnessState::Compared, HarnessState::Reported)
        )
    }

    /// Move to `to`, panicking in debug builds on an invalid edge. The
    /// orchestrator only ever drives valid edges; the check documents the
    /// graph rather than guarding untrusted input.
    pub fn advance(&mut self, to: HarnessState) {
        debug_assert!(
            Self::is_valid_transition(*self, to),
            "invalid harness state transition: {self} -> {to}"
        );
        *self = to;
    }

    pub fn is_terminal(&self) -> bool {
        *self == HarnessState::Reported
    }
}

impl fmt::Display for HarnessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HarnessState::Pending => "pending",
            HarnessState::ProgrammaticRunning => "programmatic-running",
            HarnessState::DeclarativeRunning => "declarative-running",
            HarnessState::Compared => "compared",
            HarnessState::Reported => "reported",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [HarnessState; 5] = [
        HarnessState::Pending,
        HarnessState::ProgrammaticRunning,
        HarnessState::DeclarativeRunning,
        HarnessState::Compared,
        HarnessState::Reported,
    ];

    #[test]
    fn happy_path_is_valid() {
        let mut state = HarnessState::Pending;
        for next in [
            HarnessState::ProgrammaticRunning,
            HarnessState::DeclarativeRunning,
            HarnessState::Compared,
            HarnessState::Reported,
        ] {
            assert!(HarnessState::is_valid_transition(state, next));
            state.advance(next);
        }
        assert!(state.is_terminal());
    }

    #[test]
    fn error_exits_skip_compared() {
        assert!(HarnessState::is_valid_transition(
            HarnessState::ProgrammaticRunning,
            HarnessState::Reported
        ));
        assert!(HarnessState::is_valid_transition(
            HarnessState::DeclarativeRunning,
            HarnessState::Reported
        ));
    }

    #[test]
    fn reported_is_terminal() {
        for to in ALL {
            assert!(!HarnessState::is_valid_transition(HarnessState::Reported, to));
        }
    }

    #[test]
    fn no_backward_or_skipping_edges() {
        assert!(!HarnessState::is_valid_transition(
            HarnessState::Pending,
            HarnessState::DeclarativeRunning
        ));
        assert!(!HarnessState::is_valid_transition(
            HarnessState::Pending,
            HarnessState::Compared
        ));
        assert!(!HarnessState::is_valid_transition(
            HarnessState::Compared,
            HarnessState::ProgrammaticRunning
        ));
    }
}

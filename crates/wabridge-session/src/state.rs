// SPDX-FileCopyrightText: 2026 wabridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle of a single run.
//!
//! ```text
//! Idle -> IdentityResolved -> Pairing ----> Active -> Closing -> Done
//!                          \-> Connected -/                  \-> Failed
//! ```
//!
//! Any non-terminal state may move to `Failed`.

use tracing::debug;
use wabridge_core::BridgeError;

/// Phase of a session run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Nothing has happened yet.
    #[default]
    Idle,
    /// The credential store produced an identity for the account.
    IdentityResolved,
    /// Waiting for the user to complete device pairing.
    Pairing,
    /// Connected with an already-paired identity.
    Connected,
    /// Stabilized; sending and listening happen here.
    Active,
    /// Taking the final snapshot and disconnecting.
    Closing,
    /// Run finished successfully.
    Done,
    /// Run finished with an error.
    Failed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::IdentityResolved => write!(f, "identity_resolved"),
            RunState::Pairing => write!(f, "pairing"),
            RunState::Connected => write!(f, "connected"),
            RunState::Active => write!(f, "active"),
            RunState::Closing => write!(f, "closing"),
            RunState::Done => write!(f, "done"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }

    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;

        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Idle, IdentityResolved)
            | (IdentityResolved, Pairing)
            | (IdentityResolved, Connected)
            | (Pairing, Active)
            | (Connected, Active)
            | (Active, Closing)
            | (Closing, Done) => true,
            _ => false,
        }
    }
}

/// Tracks the current [`RunState`] and rejects illegal moves.
#[derive(Debug, Default)]
pub struct RunStateMachine {
    state: RunState,
}

impl RunStateMachine {
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Moves to `next`, or returns an internal error naming both states.
    pub fn advance(&mut self, next: RunState) -> Result<(), BridgeError> {
        if !self.state.can_transition_to(next) {
            return Err(BridgeError::Internal(format!(
                "invalid run state transition {} -> {}",
                self.state, next
            )));
        }
        debug!(from = %self.state, to = %next, "run state transition");
        self.state = next;
        Ok(())
    }

    /// Marks the run failed unless it already finished.
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            debug!(from = %self.state, "run failed");
            self.state = RunState::Failed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_paths_are_allowed() {
        for route in [
            [RunState::IdentityResolved, RunState::Pairing, RunState::Active],
            [RunState::IdentityResolved, RunState::Connected, RunState::Active],
        ] {
            let mut machine = RunStateMachine::default();
            for step in route {
                machine.advance(step).unwrap();
            }
            machine.advance(RunState::Closing).unwrap();
            machine.advance(RunState::Done).unwrap();
            assert!(machine.state().is_terminal());
        }
    }

    #[test]
    fn skipping_phases_is_rejected() {
        let mut machine = RunStateMachine::default();
        let err = machine.advance(RunState::Active).unwrap_err();
        assert!(err.to_string().contains("idle -> active"), "{err}");
        assert_eq!(machine.state(), RunState::Idle);
    }

    #[test]
    fn pairing_and_connected_are_exclusive() {
        assert!(!RunState::Pairing.can_transition_to(RunState::Connected));
        assert!(!RunState::Connected.can_transition_to(RunState::Pairing));
    }

    #[test]
    fn failure_is_reachable_until_terminal() {
        assert!(RunState::Closing.can_transition_to(RunState::Failed));
        assert!(!RunState::Done.can_transition_to(RunState::Failed));

        let mut machine = RunStateMachine::default();
        machine.advance(RunState::IdentityResolved).unwrap();
        machine.fail();
        assert_eq!(machine.state(), RunState::Failed);
        machine.fail();
        assert_eq!(machine.state(), RunState::Failed);
        assert!(machine.advance(RunState::Pairing).is_err());
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(RunState::IdentityResolved.to_string(), "identity_resolved");
        assert_eq!(RunState::Failed.to_string(), "failed");
    }
}

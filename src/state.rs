// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Session state machine.
//!
//! Every connection attempt gets a new generation number. Transitions carry
//! the generation they belong to, so results from a superseded attempt or a
//! stale receive loop are rejected instead of mutating the current session.

use tracing::warn;

/// Connection state of a serial session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    None,
    Connecting,
    Connected,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::None => "Not connected",
            SessionState::Connecting => "Connecting...",
            SessionState::Connected => "Connected",
        }
    }

    /// Whether `self -> next` is a legal transition.
    ///
    /// Re-entering `Connecting` from any non-idle state is allowed because a
    /// new `connect` tears down the previous attempt first.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (None, Connecting)
                | (Connecting, Connecting)
                | (Connected, Connecting)
                | (Connecting, Connected)
                | (Connecting, None)
                | (Connected, None)
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a generation-tagged transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    /// The generation is no longer the active one.
    Stale,
    /// The move is not allowed from the current state.
    Rejected,
}

/// Current state plus the generation that owns it.
#[derive(Debug, Default)]
pub struct StateMachine {
    state: SessionState,
    generation: u64,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Whether `generation` still owns a connected session.
    pub fn is_live(&self, generation: u64) -> bool {
        self.is_current(generation) && self.state == SessionState::Connected
    }

    /// Start a new attempt: invalidates every older generation and enters
    /// `Connecting`. Returns the new generation.
    pub fn begin_attempt(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.state = SessionState::Connecting;
        self.generation
    }

    pub fn transition(&mut self, generation: u64, next: SessionState) -> Transition {
        if !self.is_current(generation) {
            return Transition::Stale;
        }
        if !self.state.can_transition_to(next) {
            warn!("Rejected state transition {:?} -> {:?}", self.state, next);
            return Transition::Rejected;
        }
        self.state = next;
        Transition::Applied
    }

    /// Force `None` and invalidate all outstanding generations.
    ///
    /// Returns `true` if the state actually changed.
    pub fn reset(&mut self) -> bool {
        self.generation = self.generation.wrapping_add(1);
        let changed = self.state != SessionState::None;
        self.state = SessionState::None;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let machine = StateMachine::new();
        assert_eq!(machine.state(), SessionState::None);
        assert_eq!(machine.generation(), 0);
    }

    #[test]
    fn test_connect_success_path() {
        let mut machine = StateMachine::new();
        let generation = machine.begin_attempt();
        assert_eq!(machine.state(), SessionState::Connecting);
        assert_eq!(
            machine.transition(generation, SessionState::Connected),
            Transition::Applied
        );
        assert!(machine.is_live(generation));
        assert_eq!(
            machine.transition(generation, SessionState::None),
            Transition::Applied
        );
        assert!(!machine.is_live(generation));
    }

    #[test]
    fn test_stale_generation_is_rejected() {
        let mut machine = StateMachine::new();
        let first = machine.begin_attempt();
        let second = machine.begin_attempt();
        assert_ne!(first, second);

        assert_eq!(
            machine.transition(first, SessionState::Connected),
            Transition::Stale
        );
        assert_eq!(machine.state(), SessionState::Connecting);
        assert_eq!(
            machine.transition(second, SessionState::Connected),
            Transition::Applied
        );
    }

    #[test]
    fn test_cannot_skip_connecting() {
        let mut machine = StateMachine::new();
        let generation = machine.generation();
        assert_eq!(
            machine.transition(generation, SessionState::Connected),
            Transition::Rejected
        );
        assert_eq!(machine.state(), SessionState::None);
    }

    #[test]
    fn test_reset_invalidates_generation() {
        let mut machine = StateMachine::new();
        let generation = machine.begin_attempt();
        assert!(machine.reset());
        assert!(!machine.is_current(generation));
        assert_eq!(
            machine.transition(generation, SessionState::Connected),
            Transition::Stale
        );

        // Already idle: nothing to report.
        assert!(!machine.reset());
    }

    #[test]
    fn test_transition_table() {
        use SessionState::*;
        assert!(None.can_transition_to(Connecting));
        assert!(Connected.can_transition_to(Connecting));
        assert!(Connecting.can_transition_to(None));
        assert!(!None.can_transition_to(Connected));
        assert!(!None.can_transition_to(None));
        assert!(!Connected.can_transition_to(Connected));
    }
}

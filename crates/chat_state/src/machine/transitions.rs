//! State transitions - FSM transition logic
//!
//! Implements the state machine that handles event-driven state transitions.

use super::events::ComposerEvent;
use super::states::ComposerState;

/// Represents a state transition result.
#[derive(Debug, Clone)]
pub struct StateTransition {
    /// The state before the transition.
    pub from: ComposerState,
    /// The state after the transition.
    pub to: ComposerState,
    /// The event that triggered the transition.
    pub event: ComposerEvent,
    /// Whether the state actually changed.
    pub changed: bool,
}

/// State machine for the composer.
#[derive(Debug, Clone)]
pub struct StateMachine {
    /// Current state.
    current_state: ComposerState,
    /// Transition history (limited).
    history: Vec<StateTransition>,
    /// Max history entries to keep.
    max_history: usize,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Create a new state machine in Idle state.
    pub fn new() -> Self {
        Self::with_state(ComposerState::Idle)
    }

    /// Create a state machine with a specific initial state.
    pub fn with_state(state: ComposerState) -> Self {
        Self {
            current_state: state,
            history: Vec::new(),
            max_history: 50,
        }
    }

    /// Get the current state.
    pub fn state(&self) -> &ComposerState {
        &self.current_state
    }

    /// Get the transition history.
    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Handle an event and transition to a new state.
    pub fn handle_event(&mut self, event: ComposerEvent) -> StateTransition {
        let old_state = self.current_state.clone();
        let new_state = Self::compute_next_state(&old_state, &event);
        let changed = old_state != new_state;

        if let ComposerEvent::SubmitFailed { error } = &event {
            log::warn!("Submission failed, composer back to idle: {}", error);
        } else if !changed {
            log::trace!("Composer ignored {} in {:?}", event.name(), old_state);
        }

        self.current_state = new_state.clone();

        let transition = StateTransition {
            from: old_state,
            to: new_state,
            event,
            changed,
        };

        self.history.push(transition.clone());
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }

        transition
    }

    /// Compute the next state given current state and event.
    fn compute_next_state(state: &ComposerState, event: &ComposerEvent) -> ComposerState {
        use ComposerEvent::*;
        use ComposerState::*;

        match (state, event) {
            // ========== Typing ==========
            (Idle, InputChanged) => Composing { editing: None },
            (Composing { editing: None }, InputCleared) => Idle,

            // ========== Edit mode ==========
            (Idle | Composing { .. }, EditStarted { original_id }) => Composing {
                editing: Some(*original_id),
            },
            (Composing { editing: Some(_) }, EditCancelled) => Idle,
            (Submitting { .. }, EditStarted { original_id }) => Submitting {
                editing: Some(*original_id),
            },
            (Submitting { editing: Some(_) }, EditCancelled) => Submitting { editing: None },

            // ========== Submission ==========
            (Idle, SubmitStarted) => Submitting { editing: None },
            (Composing { editing }, SubmitStarted) => Submitting { editing: *editing },
            (Submitting { .. }, SubmitFinished | SubmitFailed { .. }) => Idle,

            // Everything else leaves the state untouched
            (current, _) => current.clone(),
        }
    }
}

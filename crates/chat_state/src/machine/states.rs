//! Composer states

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Defines the possible states of the message composer.
///
/// A failed submission is not a state of its own: the composer returns to
/// `Idle` and the failure is logged.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComposerState {
    /// Nothing typed, nothing in flight.
    #[default]
    Idle,

    /// The user is typing.
    Composing {
        /// Original message of the thread being edited, `None` for a new message.
        editing: Option<Uuid>,
    },

    /// A send or edit is waiting on the store or the generation endpoint.
    Submitting {
        /// Original message of the thread being edited, `None` for a new message.
        editing: Option<Uuid>,
    },
}

impl ComposerState {
    /// Thread currently being edited, if any
    pub fn editing(&self) -> Option<Uuid> {
        match self {
            Self::Idle => None,
            Self::Composing { editing } | Self::Submitting { editing } => *editing,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle() {
        assert_eq!(ComposerState::default(), ComposerState::Idle);
    }

    #[test]
    fn test_editing_accessor() {
        let id = Uuid::new_v4();
        assert_eq!(ComposerState::Idle.editing(), None);
        assert_eq!(ComposerState::Composing { editing: Some(id) }.editing(), Some(id));
        assert_eq!(ComposerState::Submitting { editing: None }.editing(), None);
        assert!(ComposerState::Submitting { editing: Some(id) }.is_submitting());
    }
}

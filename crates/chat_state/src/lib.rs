//! chat_state - State machine for the chat pane's composer
//!
//! Tracks whether the user is idle, typing (a new message or an edit) or
//! waiting on a submission.

pub mod machine;

// Re-export commonly used types
pub use machine::{ComposerEvent, ComposerState, StateMachine, StateTransition};

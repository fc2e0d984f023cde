//! State machine module
//!
//! Contains the FSM implementation for the composer lifecycle.

mod events;
mod states;
mod transitions;

pub use events::ComposerEvent;
pub use states::ComposerState;
pub use transitions::{StateMachine, StateTransition};

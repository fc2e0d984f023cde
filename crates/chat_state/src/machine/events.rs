//! Composer events - inputs that drive state transitions

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComposerEvent {
    /// The input field received non-empty text.
    InputChanged,

    /// The input field was emptied.
    InputCleared,

    /// The user opened a version of a thread for editing.
    EditStarted { original_id: Uuid },

    /// The user left edit mode without sending.
    EditCancelled,

    /// A send or edit passed validation and was dispatched.
    SubmitStarted,

    /// The submission completed (with or without a reply).
    SubmitFinished,

    /// The submission failed before completing.
    SubmitFailed { error: String },
}

impl ComposerEvent {
    /// Get the event name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::InputChanged => "input_changed",
            Self::InputCleared => "input_cleared",
            Self::EditStarted { .. } => "edit_started",
            Self::EditCancelled => "edit_cancelled",
            Self::SubmitStarted => "submit_started",
            Self::SubmitFinished => "submit_finished",
            Self::SubmitFailed { .. } => "submit_failed",
        }
    }
}

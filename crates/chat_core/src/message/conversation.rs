//! Conversation - a named list of messages shown in the sidebar

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ConversationId = Uuid;

/// Title given to conversations created from the sidebar
pub const DEFAULT_CONVERSATION_TITLE: &str = "New Chat";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a conversation stamped with the current time
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            created_at: Utc::now(),
        }
    }
}

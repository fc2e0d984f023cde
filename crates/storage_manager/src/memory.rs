//! In-process store

use async_trait::async_trait;
use chat_core::{Conversation, ConversationId, Message, MessageId, MessagePatch, NewMessage};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::ChatStore;

#[derive(Debug, Default)]
struct MemoryState {
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Timestamps handed out by this store are strictly increasing, so
    /// records created back to back keep their insertion order.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(stamp);
        stamp
    }
}

/// Store kept entirely in memory; contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryChatStore {
    state: RwLock<MemoryState>,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load existing records as-is (ids and timestamps are kept)
    pub async fn seed(
        &self,
        conversations: impl IntoIterator<Item = Conversation>,
        messages: impl IntoIterator<Item = Message>,
    ) {
        let mut state = self.state.write().await;
        state.conversations.extend(conversations);
        state.messages.extend(messages);
        let latest = state.messages.iter().map(|m| m.created_at).max();
        state.last_timestamp = state.last_timestamp.max(latest);
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn list_messages(&self, conversation_id: ConversationId) -> Result<Vec<Message>> {
        let state = self.state.read().await;
        let mut messages: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message> {
        let mut state = self.state.write().await;
        let created_at = state.next_timestamp();
        let message = Message::from_new(message, created_at);
        state.messages.push(message.clone());
        Ok(message)
    }

    async fn update_message(&self, id: MessageId, patch: MessagePatch) -> Result<()> {
        let mut state = self.state.write().await;
        let message = state
            .messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(StoreError::NotFound(id))?;
        message.apply(&patch);
        Ok(())
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        let mut conversations = self.state.read().await.conversations.clone();
        conversations.sort_by_key(|c| c.created_at);
        Ok(conversations)
    }

    async fn insert_conversation(&self, title: &str) -> Result<Conversation> {
        let mut state = self.state.write().await;
        let conversation = Conversation {
            id: Uuid::new_v4(),
            title: title.to_string(),
            created_at: state.next_timestamp(),
        };
        state.conversations.push(conversation.clone());
        Ok(conversation)
    }
}

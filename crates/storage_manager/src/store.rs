//! Store trait consumed by the chat session and the conversation directory

use async_trait::async_trait;
use chat_core::{Conversation, ConversationId, Message, MessageId, MessagePatch, NewMessage};

use crate::error::Result;

#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Messages of one conversation, ordered by `created_at` ascending
    async fn list_messages(&self, conversation_id: ConversationId) -> Result<Vec<Message>>;

    /// Insert a message; the store assigns `id` and `created_at`
    async fn insert_message(&self, message: NewMessage) -> Result<Message>;

    /// Partially update a message
    async fn update_message(&self, id: MessageId, patch: MessagePatch) -> Result<()>;

    /// All conversations, ordered by `created_at` ascending
    async fn list_conversations(&self) -> Result<Vec<Conversation>>;

    async fn insert_conversation(&self, title: &str) -> Result<Conversation>;
}

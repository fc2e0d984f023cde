//! Conversation directory (sidebar)

use std::sync::Arc;

use chat_core::{Conversation, ConversationId, DEFAULT_CONVERSATION_TITLE};
use log::info;
use serde::Serialize;
use storage_manager::ChatStore;
use tokio::sync::RwLock;

use crate::error::Result;

/// One row of the directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub conversation: Conversation,
    pub selected: bool,
}

/// Cached list of conversations backed by a store.
pub struct ConversationDirectory {
    store: Arc<dyn ChatStore>,
    conversations: RwLock<Vec<Conversation>>,
}

impl ConversationDirectory {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self {
            store,
            conversations: RwLock::new(Vec::new()),
        }
    }

    /// Reload the listing from the store
    pub async fn refresh(&self) -> Result<Vec<Conversation>> {
        let conversations = self.store.list_conversations().await?;
        *self.conversations.write().await = conversations.clone();
        Ok(conversations)
    }

    /// Create a conversation, titled "New Chat" unless `title` is given.
    pub async fn create(&self, title: Option<&str>) -> Result<Conversation> {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_CONVERSATION_TITLE);
        let conversation = self.store.insert_conversation(title).await?;
        info!("Created conversation {} ({})", conversation.id, conversation.title);

        self.conversations.write().await.push(conversation.clone());
        Ok(conversation)
    }

    pub async fn conversations(&self) -> Vec<Conversation> {
        self.conversations.read().await.clone()
    }

    pub async fn get(&self, id: ConversationId) -> Option<Conversation> {
        self.conversations
            .read()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// Listing with the `selected` conversation marked
    pub async fn entries(&self, selected: Option<ConversationId>) -> Vec<DirectoryEntry> {
        self.conversations
            .read()
            .await
            .iter()
            .map(|conversation| DirectoryEntry {
                selected: Some(conversation.id) == selected,
                conversation: conversation.clone(),
            })
            .collect()
    }
}

//! Local SQLite message store

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chat_core::{Conversation, ConversationId, Message, MessageId, MessagePatch, NewMessage};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::store::ChatStore;

/// SQLite-backed store. Each operation opens its own connection on the
/// blocking pool.
#[derive(Debug, Clone)]
pub struct SqliteChatStore {
    db_path: PathBuf,
}

impl SqliteChatStore {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    /// Open the database at `db_path` and create the schema if needed
    pub async fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let store = Self::new(db_path);
        store.init().await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub async fn init(&self) -> Result<()> {
        self.with_connection(|connection| {
            connection.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS conversations (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS messages (
                    id TEXT PRIMARY KEY,
                    conversation_id TEXT NOT NULL,
                    text TEXT NOT NULL,
                    response TEXT,
                    parent_message_id TEXT,
                    edited INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL,
                    FOREIGN KEY(conversation_id) REFERENCES conversations(id) ON DELETE CASCADE
                );

                CREATE INDEX IF NOT EXISTS idx_messages_conversation
                    ON messages(conversation_id, created_at);
                CREATE INDEX IF NOT EXISTS idx_conversations_created_at
                    ON conversations(created_at);
                "#,
            )?;
            Ok(())
        })
        .await
    }

    async fn with_connection<T, F>(&self, func: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let connection = open_connection(&db_path)?;
            func(&connection)
        })
        .await
        .map_err(|error| StoreError::Task(error.to_string()))?
    }
}

#[async_trait]
impl ChatStore for SqliteChatStore {
    async fn list_messages(&self, conversation_id: ConversationId) -> Result<Vec<Message>> {
        let conversation_id = conversation_id.to_string();

        self.with_connection(move |connection| {
            let mut statement = connection.prepare(
                r#"
                SELECT id, conversation_id, text, response, parent_message_id, edited, created_at
                FROM messages
                WHERE conversation_id = ?1
                ORDER BY created_at ASC, rowid ASC
                "#,
            )?;
            let rows = statement.query_map(params![conversation_id], read_message_row)?;

            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?.into_message()?);
            }
            Ok(messages)
        })
        .await
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message> {
        let message = Message::from_new(message, Utc::now());
        let stored = message.clone();

        self.with_connection(move |connection| {
            connection.execute(
                r#"
                INSERT INTO messages (
                    id, conversation_id, text, response, parent_message_id, edited, created_at
                ) VALUES (?1, ?2, ?3, NULL, ?4, 0, ?5)
                "#,
                params![
                    stored.id.to_string(),
                    stored.conversation_id.to_string(),
                    stored.text,
                    stored.parent_message_id.map(|id| id.to_string()),
                    format_timestamp(stored.created_at),
                ],
            )?;
            Ok(())
        })
        .await?;

        Ok(message)
    }

    async fn update_message(&self, id: MessageId, patch: MessagePatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        self.with_connection(move |connection| {
            let updated = connection.execute(
                r#"
                UPDATE messages
                SET edited = COALESCE(?1, edited),
                    response = COALESCE(?2, response)
                WHERE id = ?3
                "#,
                params![patch.edited, patch.response, id.to_string()],
            )?;
            if updated == 0 {
                return Err(StoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        self.with_connection(|connection| {
            let mut statement = connection.prepare(
                "SELECT id, title, created_at FROM conversations ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = statement.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?;

            let mut conversations = Vec::new();
            for row in rows {
                let (id, title, created_at) = row?;
                conversations.push(Conversation {
                    id: parse_uuid(&id)?,
                    title,
                    created_at: parse_timestamp(&created_at)?,
                });
            }
            Ok(conversations)
        })
        .await
    }

    async fn insert_conversation(&self, title: &str) -> Result<Conversation> {
        let conversation = Conversation::new(title);
        let stored = conversation.clone();

        self.with_connection(move |connection| {
            connection.execute(
                "INSERT INTO conversations (id, title, created_at) VALUES (?1, ?2, ?3)",
                params![
                    stored.id.to_string(),
                    stored.title,
                    format_timestamp(stored.created_at)
                ],
            )?;
            Ok(())
        })
        .await?;

        Ok(conversation)
    }
}

/// Raw column values of a `messages` row
struct MessageRow {
    id: String,
    conversation_id: String,
    text: String,
    response: Option<String>,
    parent_message_id: Option<String>,
    edited: bool,
    created_at: String,
}

impl MessageRow {
    fn into_message(self) -> Result<Message> {
        Ok(Message {
            id: parse_uuid(&self.id)?,
            conversation_id: parse_uuid(&self.conversation_id)?,
            text: self.text,
            response: self.response,
            parent_message_id: self.parent_message_id.as_deref().map(parse_uuid).transpose()?,
            edited: self.edited,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

fn read_message_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        text: row.get(2)?,
        response: row.get(3)?,
        parent_message_id: row.get(4)?,
        edited: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn open_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let connection = Connection::open(path)?;
    connection.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA foreign_keys = ON;
        PRAGMA synchronous = NORMAL;
        "#,
    )?;
    Ok(connection)
}

/// Fixed-width so that lexical order in SQL matches chronological order
fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| StoreError::InvalidData(format!("bad uuid {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    async fn open_store(dir: &tempfile::TempDir) -> SqliteChatStore {
        SqliteChatStore::open(dir.path().join("chat.db"))
            .await
            .expect("open store")
    }

    #[tokio::test]
    async fn storage_round_trips_conversations_in_creation_order() {
        let dir = tempdir().expect("temp dir");
        let store = open_store(&dir).await;

        let first = store.insert_conversation("New Chat").await.expect("insert");
        let second = store.insert_conversation("Second").await.expect("insert");

        let listed = store.list_conversations().await.expect("list");
        let ids: Vec<_> = listed.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(listed[0].title, "New Chat");
    }

    #[tokio::test]
    async fn storage_lists_messages_with_nullable_columns() {
        let dir = tempdir().expect("temp dir");
        let store = open_store(&dir).await;
        let conversation = store.insert_conversation("c").await.expect("insert");

        let original = store
            .insert_message(NewMessage::original(conversation.id, "hello"))
            .await
            .expect("insert original");
        let successor = store
            .insert_message(NewMessage::successor(conversation.id, original.id, "hello again"))
            .await
            .expect("insert successor");

        let messages = store.list_messages(conversation.id).await.expect("list");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, original.id);
        assert!(messages[0].parent_message_id.is_none());
        assert!(messages[0].response.is_none());
        assert!(!messages[0].edited);
        assert_eq!(messages[1].id, successor.id);
        assert_eq!(messages[1].parent_message_id, Some(original.id));
    }

    #[tokio::test]
    async fn storage_applies_partial_updates() {
        let dir = tempdir().expect("temp dir");
        let store = open_store(&dir).await;
        let conversation = store.insert_conversation("c").await.expect("insert");
        let message = store
            .insert_message(NewMessage::original(conversation.id, "question"))
            .await
            .expect("insert");

        store
            .update_message(message.id, MessagePatch::response("answer"))
            .await
            .expect("set response");
        store
            .update_message(message.id, MessagePatch::mark_edited())
            .await
            .expect("mark edited");

        let stored = &store.list_messages(conversation.id).await.expect("list")[0];
        assert!(stored.edited);
        assert_eq!(stored.response.as_deref(), Some("answer"));
    }

    #[tokio::test]
    async fn storage_reports_missing_message_on_update() {
        let dir = tempdir().expect("temp dir");
        let store = open_store(&dir).await;

        let missing = Uuid::new_v4();
        let err = store
            .update_message(missing, MessagePatch::mark_edited())
            .await
            .expect_err("should fail");
        assert!(matches!(err, StoreError::NotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn storage_rejects_message_for_unknown_conversation() {
        let dir = tempdir().expect("temp dir");
        let store = open_store(&dir).await;

        let err = store
            .insert_message(NewMessage::original(Uuid::new_v4(), "orphan"))
            .await
            .expect_err("foreign key violation");
        assert!(matches!(err, StoreError::Sqlite(_)));
    }

    #[tokio::test]
    async fn storage_survives_reopen() {
        let dir = tempdir().expect("temp dir");
        let conversation = {
            let store = open_store(&dir).await;
            let conversation = store.insert_conversation("persisted").await.expect("insert");
            store
                .insert_message(NewMessage::original(conversation.id, "kept"))
                .await
                .expect("insert");
            conversation
        };

        let reopened = open_store(&dir).await;
        let messages = reopened.list_messages(conversation.id).await.expect("list");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "kept");
    }
}

//! Store backed by a hosted PostgREST API (e.g. Supabase).
//!
//! Tables are addressed as `{base_url}/rest/v1/{table}`; filters use the
//! PostgREST `column=eq.value` syntax.

use async_trait::async_trait;
use chat_core::{Conversation, ConversationId, Message, MessageId, MessagePatch, NewMessage};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};
use crate::store::ChatStore;

const MESSAGES_TABLE: &str = "messages";
const CONVERSATIONS_TABLE: &str = "conversations";

#[derive(Serialize)]
struct NewConversation<'a> {
    title: &'a str,
}

#[derive(Debug, Clone)]
pub struct RestChatStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestChatStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Use a preconfigured HTTP client (proxies, default headers)
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let request = self.authorized(self.client.get(self.table_url(table)).query(query));
        let response = check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn insert_one<B, T>(&self, table: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(&[body]);
        let response = check_status(request.send().await?).await?;
        let mut rows: Vec<T> = response.json().await?;
        if rows.is_empty() {
            return Err(StoreError::InvalidData(format!(
                "insert into {table} returned no rows"
            )));
        }
        Ok(rows.swap_remove(0))
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    log::error!("Store request failed with HTTP {}: {}", status, body);
    Err(StoreError::Api {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ChatStore for RestChatStore {
    async fn list_messages(&self, conversation_id: ConversationId) -> Result<Vec<Message>> {
        self.select(
            MESSAGES_TABLE,
            &[
                ("select", "*".to_string()),
                ("conversation_id", format!("eq.{conversation_id}")),
                ("order", "created_at.asc".to_string()),
            ],
        )
        .await
    }

    async fn insert_message(&self, message: NewMessage) -> Result<Message> {
        self.insert_one(MESSAGES_TABLE, &message).await
    }

    async fn update_message(&self, id: MessageId, patch: MessagePatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let request = self
            .authorized(self.client.patch(self.table_url(MESSAGES_TABLE)))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&patch);
        let response = check_status(request.send().await?).await?;
        let rows: Vec<Message> = response.json().await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        self.select(
            CONVERSATIONS_TABLE,
            &[
                ("select", "*".to_string()),
                ("order", "created_at.asc".to_string()),
            ],
        )
        .await
    }

    async fn insert_conversation(&self, title: &str) -> Result<Conversation> {
        self.insert_one(CONVERSATIONS_TABLE, &NewConversation { title })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message_json(id: Uuid, conversation_id: Uuid, text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "conversation_id": conversation_id,
            "text": text,
            "response": null,
            "parent_message_id": null,
            "edited": false,
            "created_at": "2024-05-01T10:00:00.000000Z"
        })
    }

    #[tokio::test]
    async fn test_list_messages_filters_and_orders() {
        let server = MockServer::start().await;
        let conversation_id = Uuid::new_v4();
        let message_id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/rest/v1/messages"))
            .and(query_param("conversation_id", format!("eq.{conversation_id}")))
            .and(query_param("order", "created_at.asc"))
            .and(header("apikey", "anon-key"))
            .and(header("Authorization", "Bearer anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                message_json(message_id, conversation_id, "hello")
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let store = RestChatStore::new(server.uri(), "anon-key");
        let messages = store.list_messages(conversation_id).await.unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, message_id);
        assert_eq!(messages[0].text, "hello");
    }

    #[tokio::test]
    async fn test_insert_message_returns_representation() {
        let server = MockServer::start().await;
        let conversation_id = Uuid::new_v4();
        let message_id = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/rest/v1/messages"))
            .and(header("Prefer", "return=representation"))
            .and(body_json(serde_json::json!([
                { "conversation_id": conversation_id, "text": "hi" }
            ])))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([
                message_json(message_id, conversation_id, "hi")
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let store = RestChatStore::new(format!("{}/", server.uri()), "anon-key");
        let message = store
            .insert_message(NewMessage::original(conversation_id, "hi"))
            .await
            .unwrap();

        assert_eq!(message.id, message_id);
        assert!(message.parent_message_id.is_none());
    }

    #[tokio::test]
    async fn test_update_message_sends_patch() {
        let server = MockServer::start().await;
        let message_id = Uuid::new_v4();
        let mut updated = message_json(message_id, Uuid::new_v4(), "hello");
        updated["response"] = serde_json::json!("generated");

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/messages"))
            .and(query_param("id", format!("eq.{message_id}")))
            .and(header("Prefer", "return=representation"))
            .and(body_json(serde_json::json!({ "response": "generated" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([updated])))
            .expect(1)
            .mount(&server)
            .await;

        let store = RestChatStore::new(server.uri(), "anon-key");
        store
            .update_message(message_id, MessagePatch::response("generated"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_unknown_message_is_not_found() {
        let server = MockServer::start().await;
        let message_id = Uuid::new_v4();

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let store = RestChatStore::new(server.uri(), "anon-key");
        let err = store
            .update_message(message_id, MessagePatch::mark_edited())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == message_id));
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/conversations"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let store = RestChatStore::new(server.uri(), "wrong");
        let err = store.list_conversations().await.unwrap_err();

        match err {
            StoreError::Api { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid api key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_insert_conversation_with_empty_representation_fails() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/conversations"))
            .and(body_json(serde_json::json!([{ "title": "New Chat" }])))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let store = RestChatStore::new(server.uri(), "anon-key");
        let err = store.insert_conversation("New Chat").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }
}

//! Message records and the payloads used to create and patch them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::conversation::ConversationId;

pub type MessageId = Uuid;

/// A persisted user message together with its generated reply.
///
/// A message whose `parent_message_id` is set is an edited successor of that
/// parent. The parent carries `edited = true` once at least one successor
/// exists.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub text: String,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub parent_message_id: Option<MessageId>,
    #[serde(default)]
    pub edited: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Materialize an insert payload into a full record
    pub fn from_new(new: NewMessage, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id: new.conversation_id,
            text: new.text,
            response: None,
            parent_message_id: new.parent_message_id,
            edited: false,
            created_at,
        }
    }

    /// Id of the original message an edit of this message should branch from.
    ///
    /// Successors (and the self-referencing first version of a thread) point
    /// at their original through `parent_message_id`.
    pub fn edit_target(&self) -> MessageId {
        self.parent_message_id.unwrap_or(self.id)
    }

    pub fn apply(&mut self, patch: &MessagePatch) {
        if let Some(edited) = patch.edited {
            self.edited = edited;
        }
        if let Some(response) = &patch.response {
            self.response = Some(response.clone());
        }
    }
}

/// Fields supplied when inserting a message; the store assigns the rest.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<MessageId>,
}

impl NewMessage {
    pub fn original(conversation_id: ConversationId, text: impl Into<String>) -> Self {
        Self {
            conversation_id,
            text: text.into(),
            parent_message_id: None,
        }
    }

    pub fn successor(
        conversation_id: ConversationId,
        parent_message_id: MessageId,
        text: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id,
            text: text.into(),
            parent_message_id: Some(parent_message_id),
        }
    }
}

/// Partial update of a stored message. Unset fields are left untouched.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct MessagePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

impl MessagePatch {
    pub fn mark_edited() -> Self {
        Self {
            edited: Some(true),
            ..Default::default()
        }
    }

    pub fn response(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.edited.is_none() && self.response.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_new_starts_unedited_without_response() {
        let conversation_id = Uuid::new_v4();
        let message = Message::from_new(NewMessage::original(conversation_id, "hi"), Utc::now());

        assert_eq!(message.conversation_id, conversation_id);
        assert_eq!(message.text, "hi");
        assert!(message.response.is_none());
        assert!(message.parent_message_id.is_none());
        assert!(!message.edited);
    }

    #[test]
    fn test_edit_target_follows_parent() {
        let conversation_id = Uuid::new_v4();
        let original = Message::from_new(NewMessage::original(conversation_id, "v1"), Utc::now());
        let successor = Message::from_new(
            NewMessage::successor(conversation_id, original.id, "v2"),
            Utc::now(),
        );

        assert_eq!(original.edit_target(), original.id);
        assert_eq!(successor.edit_target(), original.id);
    }

    #[test]
    fn test_apply_patch_only_touches_set_fields() {
        let mut message =
            Message::from_new(NewMessage::original(Uuid::new_v4(), "hello"), Utc::now());

        message.apply(&MessagePatch::response("world"));
        assert_eq!(message.response.as_deref(), Some("world"));
        assert!(!message.edited);

        message.apply(&MessagePatch::mark_edited());
        assert!(message.edited);
        assert_eq!(message.response.as_deref(), Some("world"));
    }

    #[test]
    fn test_patch_serialization_skips_unset_fields() {
        let json = serde_json::to_value(MessagePatch::mark_edited()).unwrap();
        assert_eq!(json, serde_json::json!({ "edited": true }));
        assert!(MessagePatch::default().is_empty());
    }

    #[test]
    fn test_new_original_omits_parent_on_the_wire() {
        let json = serde_json::to_value(NewMessage::original(Uuid::nil(), "x")).unwrap();
        assert!(json.get("parent_message_id").is_none());
    }

    #[test]
    fn test_message_deserializes_nullable_columns() {
        let json = serde_json::json!({
            "id": "00000000-0000-0000-0000-000000000001",
            "conversation_id": "00000000-0000-0000-0000-000000000002",
            "text": "hello",
            "response": null,
            "parent_message_id": null,
            "created_at": "2024-05-01T10:00:00Z"
        });
        let message: Message = serde_json::from_value(json).unwrap();
        assert!(!message.edited);
        assert!(message.response.is_none());
    }
}

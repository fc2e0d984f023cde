//! Message module - persisted chat records
//!
//! Shared record types exchanged with every store implementation.

mod conversation;
mod record;

pub use conversation::{Conversation, ConversationId, DEFAULT_CONVERSATION_TITLE};
pub use record::{Message, MessageId, MessagePatch, NewMessage};

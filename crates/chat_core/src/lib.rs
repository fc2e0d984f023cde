//! chat_core - Core types for the threaded chat client
//!
//! This crate provides the foundational types used across all chat-related crates:
//! - `message` - persisted Message and Conversation records, insert/patch payloads
//! - `thread` - edit-history threads rebuilt from a flat message list, per-thread cursors
//! - `config` - client configuration (store backend, inference endpoint, proxies)
//! - `paths` - well-known locations under the user's home directory

pub mod config;
pub mod message;
pub mod paths;
pub mod thread;

// Re-export commonly used types
pub use config::{Config, InferenceConfig, StoreBackend, StoreConfig};
pub use message::{
    Conversation, ConversationId, Message, MessageId, MessagePatch, NewMessage,
    DEFAULT_CONVERSATION_TITLE,
};
pub use thread::{reconstruct, Direction, Thread, ThreadCursors};

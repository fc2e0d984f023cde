//! # Storage Manager
//!
//! Persistence for conversations and messages behind the [`ChatStore`] trait.
//! Three backends are provided: an in-process store, a local SQLite file and
//! a hosted PostgREST (Supabase) database.

pub mod error;
pub mod memory;
pub mod rest;
pub mod sqlite;
pub mod store;

// Re-exports
pub use error::{Result, StoreError};
pub use memory::MemoryChatStore;
pub use rest::RestChatStore;
pub use sqlite::SqliteChatStore;
pub use store::ChatStore;

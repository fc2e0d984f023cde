//! # Session Manager
//!
//! Owns the chat pane's view state (selected conversation, input, edit
//! marker, threads and cursors) and orchestrates sending new messages and
//! new versions of existing ones against a store and a reply generator.

pub mod directory;
pub mod error;
pub mod manager;
pub mod structs;

// Re-exports
pub use directory::{ConversationDirectory, DirectoryEntry};
pub use error::{Result, SessionError, ValidationError};
pub use manager::ChatSession;
pub use structs::{SendOutcome, ThreadView, ViewState};

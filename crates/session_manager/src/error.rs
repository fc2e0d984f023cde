//! Session error types

use storage_manager::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Input rejected before any store or network call is made
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("message text is empty")]
    EmptyText,

    #[error("no conversation selected")]
    NoConversationSelected,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Message not found: {0}")]
    MessageNotFound(Uuid),

    #[error("Thread not found: {0}")]
    ThreadNotFound(Uuid),
}

pub type Result<T> = std::result::Result<T, SessionError>;

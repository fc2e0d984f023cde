//! Reply generation seam used by the chat session

use async_trait::async_trait;

use crate::error::Result;

/// Produces a reply for a user message.
///
/// Implementations are long-latency network calls; callers must not hold
/// shared view state across `generate`.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

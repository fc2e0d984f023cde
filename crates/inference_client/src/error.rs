//! Generation error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest_middleware::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed generation response: {0}")]
    MalformedResponse(String),

    #[error("generation response contained no text")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, GenerationError>;

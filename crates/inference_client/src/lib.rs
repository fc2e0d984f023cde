//! inference_client - hosted text-generation endpoint client

pub mod client;
pub mod error;
pub mod generator;
pub mod http_utils;

pub use client::InferenceClient;
pub use error::{GenerationError, Result};
pub use generator::ReplyGenerator;
pub use http_utils::build_http_client;

//! Hosted text-generation client

use async_trait::async_trait;
use chat_core::Config;
use log::{debug, error, info};
use reqwest::Client;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};
use crate::generator::ReplyGenerator;
use crate::http_utils::{build_http_client, build_retry_client};

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    #[serde(default)]
    generated_text: Option<String>,
}

/// Client for a hosted text-generation endpoint.
///
/// Sends `{"inputs": prompt}` with a bearer credential and reads the reply
/// from the first element of the returned array.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    /// Base client with proxies applied; the middleware stack wraps it
    http: Client,
    client: ClientWithMiddleware,
    endpoint: String,
    api_key: Option<String>,
}

impl InferenceClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let http = Client::new();
        Self {
            client: build_retry_client(http.clone(), 0),
            http,
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    /// Build from configuration: endpoint, credential, proxies and retries.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = build_http_client(config)?;
        Ok(Self {
            client: build_retry_client(http.clone(), config.inference.max_retries),
            http,
            endpoint: config.inference.api_base.clone(),
            api_key: config.inference.api_key.clone(),
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.client = build_retry_client(self.http.clone(), max_retries);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn parse_generation_body(body: &str) -> Result<String> {
    let results: Vec<GeneratedText> = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(format!("{e}: {body}")))?;
    results
        .into_iter()
        .next()
        .and_then(|first| first.generated_text)
        .ok_or(GenerationError::EmptyResponse)
}

#[async_trait]
impl ReplyGenerator for InferenceClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        info!("Requesting generated reply from {}", self.endpoint);

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&GenerationRequest { inputs: prompt });
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request.send().await.map_err(|e| {
            error!("Failed to send generation request: {}", e);
            e
        })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Generation endpoint returned HTTP {}: {}", status, body);
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply = parse_generation_body(&body)?;
        debug!("Generated reply of {} chars", reply.len());
        Ok(reply)
    }
}

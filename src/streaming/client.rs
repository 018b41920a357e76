//! OpenAI-compatible chat-completion client
//!
//! Talks to `POST {base_url}/chat/completions`. The default base URL points at
//! the OpenAI-compatible API of a local Ollama server.

use crate::errors::{F2ReadError, Result};
use crate::streaming::parser::decode_event_stream;
use crate::streaming::types::{ChatChunk, ChatCompletion, ChatRequest};
use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::{Client, Response};

/// Default completion endpoint (Ollama's OpenAI-compatible API)
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";

/// Ollama ignores the key but the protocol requires one
pub const DEFAULT_API_KEY: &str = "ollama";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "F2READ_API_KEY";

/// Seam between the pipeline and the remote completion service
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send a request and wait for the whole reply
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion>;

    /// Send a streaming request and return its chunks as they arrive
    async fn complete_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<ChatChunk>>>;
}

/// HTTP chat-completion client
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ChatClient {
    /// Create client with custom endpoint and key
    pub fn with_config(base_url: &str, api_key: &str) -> Result<Self> {
        // no request timeout
        let client = Client::builder().build().map_err(F2ReadError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Key from `F2READ_API_KEY`, falling back to the Ollama placeholder
    pub fn api_key_from_env() -> String {
        std::env::var(API_KEY_ENV).unwrap_or_else(|_| DEFAULT_API_KEY.to_string())
    }

    /// Full completions URL
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: &ChatRequest) -> Result<Response> {
        let url = self.completions_url();
        tracing::debug!(url = %url, model = %request.model, stream = request.stream, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| F2ReadError::ApiError(format!("Failed to send request to {}: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(F2ReadError::ApiError(format!("HTTP {}: {}", status, error_text)));
        }

        Ok(response)
    }
}

#[async_trait]
impl CompletionBackend for ChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let response = self.send(request).await?;
        let body = response.text().await?;

        serde_json::from_str(&body)
            .map_err(|e| F2ReadError::ApiError(format!("Failed to parse completion: {}", e)))
    }

    async fn complete_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<BoxStream<'static, Result<ChatChunk>>> {
        let response = self.send(request).await?;

        let bytes = response.bytes_stream().map(|result| {
            result
                .map(|bytes| bytes.to_vec())
                .map_err(|e| F2ReadError::StreamingError(e.to_string()))
        });

        Ok(decode_event_stream(Box::pin(bytes)))
    }
}

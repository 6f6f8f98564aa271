//! Chat model client
//!
//! Non-streaming text generation through an Ollama daemon
//! (`POST /api/generate`).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RagError;

// ============================================================================
// ChatModel Trait
// ============================================================================

/// Generates answer text from a fully assembled prompt.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, RagError>;

    /// Model name (for logs).
    fn name(&self) -> &str;
}

// ============================================================================
// Ollama Chat
// ============================================================================

/// Generation can be slow on CPU-bound hosts; still bounded.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Chat client for an Ollama daemon.
#[derive(Debug)]
pub struct OllamaChat {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

impl OllamaChat {
    pub fn new(base_url: &str, model: &str) -> Result<Self, RagError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RagError::ChatModel(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl ChatModel for OllamaChat {
    async fn generate(&self, prompt: &str) -> Result<String, RagError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::ChatModel(format!("failed to reach Ollama at {url}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RagError::ChatModel(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<OllamaError>(&body) {
                return Err(RagError::ChatModel(format!(
                    "Ollama error ({status}): {}",
                    err.error
                )));
            }
            return Err(RagError::ChatModel(format!("Ollama error ({status}): {body}")));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| RagError::ChatModel(format!("failed to parse generate response: {e}")))?;

        Ok(parsed.response.trim().to_string())
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Tests
// ============================================================================

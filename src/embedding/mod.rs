//! Embedding - text vectorization through Ollama
//!
//! One `EmbeddingProvider` instance serves both ingestion-time chunk
//! embedding and query-time embedding. There is deliberately no divergent
//! preprocessing between the two call sites; any asymmetry silently degrades
//! retrieval quality.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::EMBEDDING_DIMENSION;
use crate::error::RagError;

// ============================================================================
// EmbeddingProvider Trait
// ============================================================================

/// Converts text into fixed-dimension vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts, one vector per input in the same order.
    /// All-or-nothing: a failed batch returns an error, never a partial
    /// result.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| RagError::Embedding("empty embedding response".into()))
    }

    /// Output vector dimension.
    fn dimension(&self) -> usize;

    /// Provider name (for logs).
    fn name(&self) -> &str;
}

// ============================================================================
// Ollama Embedder
// ============================================================================

/// Request timeout for embedding calls. Bounded so a stuck daemon cannot
/// block a request indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Embedding client for an Ollama daemon (`POST /api/embed`).
#[derive(Debug)]
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

impl OllamaEmbedder {
    /// Create an embedder for the given daemon and model. The default
    /// dimension matches `nomic-embed-text`.
    pub fn new(base_url: &str, model: &str) -> Result<Self, RagError> {
        Self::with_dimension(base_url, model, EMBEDDING_DIMENSION)
    }

    pub fn with_dimension(base_url: &str, model: &str, dimension: usize) -> Result<Self, RagError> {
        if dimension == 0 {
            return Err(RagError::Config("embedding dimension must be positive".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RagError::Embedding(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimension,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let url = format!("{}/api/embed", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Embedding(format!("failed to reach Ollama at {url}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RagError::Embedding(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            if let Ok(err) = serde_json::from_str::<OllamaError>(&body) {
                return Err(RagError::Embedding(format!(
                    "Ollama error ({status}): {}",
                    err.error
                )));
            }
            return Err(RagError::Embedding(format!("Ollama error ({status}): {body}")));
        }

        let parsed: EmbedResponse = serde_json::from_str(&body)
            .map_err(|e| RagError::Embedding(format!("failed to parse embedding response: {e}")))?;

        if parsed.embeddings.len() != texts.len() {
            return Err(RagError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.embeddings.len()
            )));
        }

        for vector in &parsed.embeddings {
            if vector.len() != self.dimension {
                return Err(RagError::Embedding(format!(
                    "model returned dimension {} but index expects {}",
                    vector.len(),
                    self.dimension
                )));
            }
        }

        Ok(parsed.embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Startup configuration
//!
//! All configuration is read from the environment exactly once at process
//! startup into an immutable `AppConfig`. Missing required variables abort
//! with a diagnostic naming the variable before any traffic is accepted.

use crate::error::RagError;

/// Embedding dimension for `nomic-embed-text`. The Pinecone index must be
/// created with the same dimension; this is verified at connection setup.
pub const EMBEDDING_DIMENSION: usize = 768;

/// Default number of chunks retrieved per query. Kept small to bound context
/// size and generation latency.
pub const DEFAULT_TOP_K: usize = 2;

/// Process-wide configuration, immutable after startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Pinecone API key.
    pub pinecone_api_key: String,
    /// Pinecone index name.
    pub pinecone_index: String,
    /// Base URL of the Ollama daemon.
    pub ollama_base_url: String,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Chat model identifier.
    pub chat_model: String,
    /// Origins allowed by the HTTP boundary.
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns `RagError::Config` naming the first missing required variable.
    pub fn from_env() -> Result<Self, RagError> {
        Ok(Self {
            pinecone_api_key: require("PINECONE_API_KEY")?,
            pinecone_index: require("PINECONE_INDEX_NAME")?,
            ollama_base_url: optional("OLLAMA_BASE_URL", "http://localhost:11434"),
            embedding_model: optional("EMBEDDING_MODEL", "nomic-embed-text"),
            chat_model: optional("CHAT_MODEL", "llama3"),
            allowed_origins: optional(
                "ALLOWED_ORIGINS",
                "http://localhost:3000,http://localhost:5173",
            )
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        })
    }
}

/// Read a required environment variable.
fn require(name: &str) -> Result<String, RagError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(RagError::Config(format!(
            "{name} environment variable not set"
        ))),
    }
}

/// Read an optional environment variable with a default.
fn optional(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

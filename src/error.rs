//! Error taxonomy
//!
//! One typed error per failure class. Configuration errors are fatal at
//! startup, loader errors are isolated per file during ingestion, service
//! errors surface to the immediate caller, validation errors become client
//! responses at the HTTP boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    /// Missing or invalid startup configuration. Fatal, aborts before traffic.
    #[error("configuration error: {0}")]
    Config(String),

    /// A single document failed to load or parse. Logged and skipped;
    /// never aborts the ingestion batch.
    #[error("failed to load {file}: {reason}")]
    Loader { file: String, reason: String },

    /// Embedding service call failed (network, model, quota).
    #[error("embedding service: {0}")]
    Embedding(String),

    /// Vector index call failed (network, auth, missing index).
    #[error("vector index: {0}")]
    Index(String),

    /// Chat model call failed.
    #[error("chat model: {0}")]
    ChatModel(String),

    /// Malformed inbound request.
    #[error("invalid request: {0}")]
    Validation(String),
}

impl RagError {
    /// True for errors that abort startup rather than a single request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

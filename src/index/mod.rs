//! Vector index - storage and similarity search over embeddings
//!
//! The index itself is an external collaborator; this module defines the
//! record types and the `VectorIndex` seam, with a Pinecone implementation
//! in `pinecone`.

pub mod pinecone;

pub use pinecone::PineconeIndex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::chunker::Chunk;
use crate::error::RagError;

// ============================================================================
// Types
// ============================================================================

/// A (vector, chunk text, metadata) triple to persist. Ids are assigned at
/// creation; ingestion is additive, so re-ingesting the same source produces
/// duplicate records (documented limitation).
#[derive(Debug, Clone)]
pub struct VectorEntry {
    pub id: String,
    pub embedding: Vec<f32>,
    pub chunk_text: String,
    pub source: String,
    pub page: Option<usize>,
}

impl VectorEntry {
    /// Pair a chunk with its embedding under a fresh record id.
    pub fn from_chunk(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            embedding,
            chunk_text: chunk.text,
            source: chunk.source,
            page: chunk.page,
        }
    }
}

/// A retrieved record with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub id: String,
    pub score: f32,
    pub chunk_text: String,
    pub source: String,
    pub page: Option<usize>,
}

// ============================================================================
// VectorIndex Trait
// ============================================================================

/// Writer + reader interface over a vector index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Persist a batch of entries. One attempt per batch; an error means the
    /// whole attempt failed, never an undetected partial write.
    async fn upsert(&self, entries: &[VectorEntry]) -> Result<usize, RagError>;

    /// Return at most `top_k` records by descending similarity to the query
    /// vector. Ties keep insertion order.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredRecord>, RagError>;

    /// Configured index dimension.
    fn dimension(&self) -> usize;

    /// Index name (for logs).
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_from_chunk_gets_unique_id() {
        let chunk = Chunk {
            text: "The sky is blue.".into(),
            source: "facts.txt".into(),
            page: None,
        };
        let a = VectorEntry::from_chunk(chunk.clone(), vec![0.0; 4]);
        let b = VectorEntry::from_chunk(chunk, vec![0.0; 4]);
        assert_ne!(a.id, b.id);
        assert_eq!(a.chunk_text, "The sky is blue.");
    }
}

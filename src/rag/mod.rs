//! RAG orchestration
//!
//! `RagEngine` owns the shared service handles and runs both pipelines:
//! ingestion (chunk -> embed -> upsert) and query (embed -> retrieve ->
//! prompt -> generate). It holds no mutable state; one engine serves every
//! request concurrently.

use std::sync::Arc;

use crate::chunker::TextChunker;
use crate::config::DEFAULT_TOP_K;
use crate::embedding::EmbeddingProvider;
use crate::error::RagError;
use crate::extractor::Document;
use crate::index::{VectorEntry, VectorIndex};
use crate::llm::ChatModel;

/// Returned verbatim when the knowledge base cannot answer. The prompt
/// instructs the model to use the same phrase, so callers can rely on it.
pub const FALLBACK_ANSWER: &str = "I don't have that information in my knowledge base.";

// ============================================================================
// RagEngine
// ============================================================================

/// Retrieval-augmented answer engine over shared, read-only service handles.
pub struct RagEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    chat: Arc<dyn ChatModel>,
    chunker: TextChunker,
    top_k: usize,
}

impl RagEngine {
    /// Wire the engine together, verifying the embedding dimension against
    /// the index before anything is written or queried.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        chat: Arc<dyn ChatModel>,
        chunker: TextChunker,
    ) -> Result<Self, RagError> {
        if embedder.dimension() != index.dimension() {
            return Err(RagError::Config(format!(
                "embedding model '{}' produces dimension {} but index '{}' expects {}",
                embedder.name(),
                embedder.dimension(),
                index.name(),
                index.dimension()
            )));
        }

        Ok(Self {
            embedder,
            index,
            chat,
            chunker,
            top_k: DEFAULT_TOP_K,
        })
    }

    /// Override the retrieval depth. The default of 2 bounds context size
    /// and generation latency; raise only after re-measuring response time.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answer a chat query from indexed knowledge.
    ///
    /// Each stage is a named intermediate: embedded query, retrieved
    /// context, assembled prompt, generated text. Any stage failure
    /// propagates as-is; there are no automatic retries.
    pub async fn answer(&self, question: &str) -> Result<String, RagError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::Validation("message must not be empty".into()));
        }

        let query_embedding = self.embedder.embed(question).await?;

        let retrieved = self.index.query(&query_embedding, self.top_k).await?;
        if retrieved.is_empty() {
            // Nothing indexed that could ground an answer; skip generation.
            tracing::debug!("No context retrieved for query, returning fallback");
            return Ok(FALLBACK_ANSWER.to_string());
        }

        let context = retrieved
            .iter()
            .map(|r| r.chunk_text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = assemble_prompt(&context, question);

        let generated = self.chat.generate(&prompt).await?;

        tracing::debug!(
            "Answered query with {} context chunks via {}",
            retrieved.len(),
            self.chat.name()
        );

        Ok(generated)
    }

    /// Chunk, embed and index one Document. Returns the number of records
    /// written; an empty Document writes nothing and is not an error.
    pub async fn ingest_document(&self, doc: &Document) -> Result<usize, RagError> {
        let chunks = self.chunker.chunk_document(doc);
        if chunks.is_empty() {
            tracing::warn!("No chunks generated for document: {}", doc.source);
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let entries: Vec<VectorEntry> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| VectorEntry::from_chunk(chunk, embedding))
            .collect();

        let written = self.index.upsert(&entries).await?;

        tracing::info!(
            "Indexed document: {} ({} chunks)",
            doc.source,
            written
        );

        Ok(written)
    }
}

/// Substitute retrieved context and the question into the grounding prompt.
/// The instruction to answer only from context and to fall back to the
/// fixed phrase is a grounding constraint, not a formatting preference.
fn assemble_prompt(context: &str, question: &str) -> String {
    format!(
        "You are an AI assistant named Jarvis.\n\
         Answer the user's question based only on the following context.\n\
         If the context doesn't contain the answer, say \"{FALLBACK_ANSWER}\"\n\
         \n\
         Context:\n\
         {context}\n\
         \n\
         Question:\n\
         {question}\n\
         \n\
         Answer:\n"
    )
}

// ============================================================================
// Tests
// ============================================================================

//! jarvis-rag - document Q&A over a vector knowledge base
//!
//! Ingests local documents (.txt, .md, .pdf, .docx) into a Pinecone index
//! using Ollama embeddings, and answers chat queries by retrieving the most
//! similar chunks and grounding an Ollama chat model on them.

pub mod chunker;
pub mod cli;
pub mod collector;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extractor;
pub mod index;
pub mod ingest;
pub mod llm;
pub mod rag;
pub mod server;

// Re-exports
pub use chunker::{Chunk, ChunkConfig, TextChunker};
pub use collector::{CollectedFile, CollectorConfig, FileCollector, FileKind};
pub use config::{AppConfig, DEFAULT_TOP_K, EMBEDDING_DIMENSION};
pub use embedding::{EmbeddingProvider, OllamaEmbedder};
pub use error::RagError;
pub use extractor::{ContentExtractor, Document};
pub use index::{PineconeIndex, ScoredRecord, VectorEntry, VectorIndex};
pub use ingest::{ingest_directory, IngestReport};
pub use llm::{ChatModel, OllamaChat};
pub use rag::{RagEngine, FALLBACK_ANSWER};

//! Batch ingestion driver
//!
//! Walks a directory, extracts each supported file and feeds the resulting
//! documents through the engine's chunk/embed/upsert pipeline. Failures are
//! isolated per file: one unreadable PDF is recorded and skipped, the rest
//! of the batch continues.

use std::path::Path;

use anyhow::{Context, Result};

use crate::collector::FileCollector;
use crate::extractor::ContentExtractor;
use crate::rag::RagEngine;

// ============================================================================
// IngestReport
// ============================================================================

/// Outcome of one batch run.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Files fully indexed.
    pub succeeded: usize,
    /// Records written to the index across all files.
    pub chunks_indexed: usize,
    /// (file, reason) for every file that was skipped.
    pub skipped: Vec<(String, String)>,
}

impl IngestReport {
    fn record_success(&mut self, chunks: usize) {
        self.succeeded += 1;
        self.chunks_indexed += chunks;
    }

    fn record_skip(&mut self, file: &str, reason: String) {
        tracing::warn!("Skipping {file}: {reason}");
        self.skipped.push((file.to_string(), reason));
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Ingest every supported file under `dir`.
///
/// Service-level failures inside a file (embedding or index errors) count
/// as skips too; only an unwalkable directory aborts the batch.
pub async fn ingest_directory(engine: &RagEngine, dir: &Path) -> Result<IngestReport> {
    let collector = FileCollector::with_defaults();
    let extractor = ContentExtractor::new();

    let files = collector
        .collect_directory(dir)
        .with_context(|| format!("failed to scan directory: {}", dir.display()))?;

    tracing::info!("Found {} ingestable files in {}", files.len(), dir.display());

    let mut report = IngestReport::default();

    for file in files {
        let display = file.path.display().to_string();

        let documents = match extractor.extract(&file.path, file.kind).await {
            Ok(docs) => docs,
            Err(e) => {
                report.record_skip(&display, format!("{e:#}"));
                continue;
            }
        };

        if documents.is_empty() {
            report.record_skip(&display, "no extractable text".to_string());
            continue;
        }

        let mut chunks = 0;
        let mut failed = None;
        for doc in &documents {
            match engine.ingest_document(doc).await {
                Ok(written) => chunks += written,
                Err(e) => {
                    failed = Some(e.to_string());
                    break;
                }
            }
        }

        match failed {
            Some(reason) => report.record_skip(&display, reason),
            // A file whose documents produced no chunks (e.g. all
            // whitespace) indexed nothing; surface that as a skip.
            None if chunks == 0 => {
                report.record_skip(&display, "no extractable text".to_string())
            }
            None => report.record_success(chunks),
        }
    }

    tracing::info!(
        "Ingestion complete: {} files indexed ({} chunks), {} skipped",
        report.succeeded,
        report.chunks_indexed,
        report.skipped.len()
    );

    Ok(report)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::TextChunker;
    use crate::embedding::EmbeddingProvider;
    use crate::error::RagError;
    use crate::index::{ScoredRecord, VectorEntry, VectorIndex};
    use crate::llm::ChatModel;
    use async_trait::async_trait;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    const DIM: usize = 4;

    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
            Ok(texts.iter().map(|_| vec![0.5; DIM]).collect())
        }

        fn dimension(&self) -> usize {
            DIM
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct RecordingIndex {
        entries: Mutex<Vec<VectorEntry>>,
        fail_upserts: bool,
    }

    impl RecordingIndex {
        fn new() -> Self {
            Self {
                entries: Mutex::new(vec![]),
                fail_upserts: false,
            }
        }

        fn failing() -> Self {
            Self {
                entries: Mutex::new(vec![]),
                fail_upserts: true,
            }
        }
    }

    #[async_trait]
    impl VectorIndex for RecordingIndex {
        async fn upsert(&self, entries: &[VectorEntry]) -> Result<usize, RagError> {
            if self.fail_upserts {
                return Err(RagError::Index("index unavailable".into()));
            }
            let mut stored = self.entries.lock().unwrap();
            stored.extend_from_slice(entries);
            Ok(entries.len())
        }

        async fn query(&self, _v: &[f32], _k: usize) -> Result<Vec<ScoredRecord>, RagError> {
            Ok(vec![])
        }

        fn dimension(&self) -> usize {
            DIM
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct NoChat;

    #[async_trait]
    impl ChatModel for NoChat {
        async fn generate(&self, _prompt: &str) -> Result<String, RagError> {
            panic!("chat model must not be called during ingestion");
        }

        fn name(&self) -> &str {
            "none"
        }
    }

    fn engine_with(index: Arc<RecordingIndex>) -> RagEngine {
        RagEngine::new(
            Arc::new(FixedEmbedder),
            index,
            Arc::new(NoChat),
            TextChunker::with_defaults(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn ingests_text_files_and_reports_counts() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "The sky is blue.").unwrap();
        fs::write(dir.path().join("b.md"), "Grass is green.").unwrap();
        fs::write(dir.path().join("c.log"), "unsupported, ignored").unwrap();

        let index = Arc::new(RecordingIndex::new());
        let engine = engine_with(index.clone());

        let report = ingest_directory(&engine, dir.path()).await.unwrap();

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.chunks_indexed, 2);
        assert!(report.skipped.is_empty());
        assert_eq!(index.entries.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn corrupt_file_is_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.txt"), "The sky is blue.").unwrap();
        fs::write(dir.path().join("broken.pdf"), b"not a real pdf").unwrap();

        let index = Arc::new(RecordingIndex::new());
        let engine = engine_with(index.clone());

        let report = ingest_directory(&engine, dir.path()).await.unwrap();

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].0.ends_with("broken.pdf"));
        assert_eq!(index.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn index_failure_counts_as_skip() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "The sky is blue.").unwrap();

        let engine = engine_with(Arc::new(RecordingIndex::failing()));
        let report = ingest_directory(&engine, dir.path()).await.unwrap();

        assert_eq!(report.succeeded, 0);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].1.contains("index unavailable"));
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        let engine = engine_with(Arc::new(RecordingIndex::new()));
        let result = ingest_directory(&engine, &missing).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn empty_file_is_reported_as_skip() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("empty.txt"), "   \n  ").unwrap();

        let engine = engine_with(Arc::new(RecordingIndex::new()));
        let report = ingest_directory(&engine, dir.path()).await.unwrap();

        assert_eq!(report.succeeded, 0);
        assert_eq!(report.skipped.len(), 1);
    }
}

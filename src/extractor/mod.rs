//! Content extraction
//!
//! Turns collected files into plain-text `Document`s:
//! - text files: read directly
//! - PDF files: pdf-extract, one Document per page
//! - DOCX files: word/document.xml plain text
//!
//! Parsers are collaborators; a failure here is a per-file loader error that
//! the ingestion driver records and skips.

pub mod docx;
pub mod pdf;

use std::path::Path;

use anyhow::{Context, Result};

use crate::collector::FileKind;

// ============================================================================
// Document
// ============================================================================

/// Raw text plus source metadata. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Document {
    /// Extracted plain text.
    pub text: String,
    /// Source file path.
    pub source: String,
    /// Page number (1-based) for paginated formats.
    pub page: Option<usize>,
}

impl Document {
    pub fn new(text: String, source: String) -> Self {
        Self {
            text,
            source,
            page: None,
        }
    }

    pub fn with_page(text: String, source: String, page: usize) -> Self {
        Self {
            text,
            source,
            page: Some(page),
        }
    }
}

// ============================================================================
// Content Extractor
// ============================================================================

/// Routes each file kind to its extraction strategy.
pub struct ContentExtractor;

impl ContentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract one or more Documents from a file.
    pub async fn extract(&self, path: &Path, kind: FileKind) -> Result<Vec<Document>> {
        match kind {
            FileKind::Text => self.extract_text(path).await,
            FileKind::Pdf => self.extract_pdf(path).await,
            FileKind::Docx => self.extract_docx(path).await,
        }
    }

    async fn extract_text(&self, path: &Path) -> Result<Vec<Document>> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read text file: {:?}", path))?;

        Ok(vec![Document::new(text, path.display().to_string())])
    }

    /// PDF parsing is CPU-bound, so it runs on the blocking pool.
    async fn extract_pdf(&self, path: &Path) -> Result<Vec<Document>> {
        let source = path.display().to_string();
        let owned = path.to_path_buf();
        let pages = tokio::task::spawn_blocking(move || pdf::extract_pdf_pages(&owned))
            .await
            .context("PDF extraction task failed")??;

        Ok(pages
            .into_iter()
            .map(|(page_num, text)| Document::with_page(text, source.clone(), page_num))
            .collect())
    }

    async fn extract_docx(&self, path: &Path) -> Result<Vec<Document>> {
        let source = path.display().to_string();
        let owned = path.to_path_buf();
        let text = tokio::task::spawn_blocking(move || docx::extract_docx_text(&owned))
            .await
            .context("DOCX extraction task failed")??;

        Ok(vec![Document::new(text, source)])
    }
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

//! File collection
//!
//! Walks a local directory tree and collects files with recognized
//! extensions (`.pdf`, `.txt`, `.docx`, plus markdown as plain text).
//! Unsupported files are skipped silently; unreadable entries are logged
//! and skipped without aborting the walk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;

// ============================================================================
// File Kinds
// ============================================================================

/// Supported source file kinds, each routed to its own extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Plain text (.txt, .md)
    Text,
    /// PDF document
    Pdf,
    /// Word document (.docx)
    Docx,
}

impl FileKind {
    /// Map a file extension to its kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" | "md" => Some(FileKind::Text),
            "pdf" => Some(FileKind::Pdf),
            "docx" => Some(FileKind::Docx),
            _ => None,
        }
    }

    /// Determine the kind from a path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

// ============================================================================
// Collected File
// ============================================================================

/// A file selected for ingestion.
#[derive(Debug, Clone)]
pub struct CollectedFile {
    /// Absolute path.
    pub path: PathBuf,
    /// Detected kind.
    pub kind: FileKind,
    /// Size in bytes.
    pub size: u64,
}

impl CollectedFile {
    /// Build a `CollectedFile`, returning `None` for unsupported extensions.
    pub fn from_path(path: PathBuf) -> Result<Option<Self>> {
        let kind = match FileKind::from_path(&path) {
            Some(k) => k,
            None => return Ok(None),
        };

        let metadata = std::fs::metadata(&path)
            .with_context(|| format!("Failed to read metadata: {:?}", path))?;

        if !metadata.is_file() {
            return Ok(None);
        }

        Ok(Some(Self {
            path,
            kind,
            size: metadata.len(),
        }))
    }
}

// ============================================================================
// File Collector
// ============================================================================

/// Collector settings.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// Respect .gitignore patterns while walking.
    pub respect_gitignore: bool,
    /// Include hidden files.
    pub include_hidden: bool,
    /// Maximum file size in bytes (0 = unlimited).
    pub max_file_size: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            respect_gitignore: true,
            include_hidden: false,
            max_file_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// Recursive directory collector.
pub struct FileCollector {
    config: CollectorConfig,
}

impl FileCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(CollectorConfig::default())
    }

    /// Recursively collect supported files from a directory.
    pub fn collect_directory(&self, path: &Path) -> Result<Vec<CollectedFile>> {
        let abs_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        if !abs_path.exists() {
            anyhow::bail!("Directory not found: {:?}", abs_path);
        }

        if !abs_path.is_dir() {
            anyhow::bail!("Not a directory: {:?}", abs_path);
        }

        let mut files = Vec::new();

        let walker = WalkBuilder::new(&abs_path)
            .hidden(!self.config.include_hidden)
            .git_ignore(self.config.respect_gitignore)
            .git_global(self.config.respect_gitignore)
            .git_exclude(self.config.respect_gitignore)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }

            match CollectedFile::from_path(entry.path().to_path_buf()) {
                Ok(Some(file)) => {
                    if self.should_include(&file) {
                        files.push(file);
                    }
                }
                Ok(None) => {} // unsupported extension
                Err(e) => {
                    tracing::warn!("Failed to collect file: {}", e);
                }
            }
        }

        // Deterministic ingestion order regardless of walk order
        files.sort_by(|a, b| a.path.cmp(&b.path));

        tracing::info!("Collected {} files from {:?}", files.len(), abs_path);
        Ok(files)
    }

    fn should_include(&self, file: &CollectedFile) -> bool {
        if self.config.max_file_size > 0 && file.size > self.config.max_file_size {
            tracing::debug!("Skipping large file: {:?} ({} bytes)", file.path, file.size);
            return false;
        }
        true
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_file_kind_from_extension() {
        assert_eq!(FileKind::from_extension("txt"), Some(FileKind::Text));
        assert_eq!(FileKind::from_extension("md"), Some(FileKind::Text));
        assert_eq!(FileKind::from_extension("PDF"), Some(FileKind::Pdf));
        assert_eq!(FileKind::from_extension("docx"), Some(FileKind::Docx));
        assert_eq!(FileKind::from_extension("exe"), None);
        assert_eq!(FileKind::from_extension("png"), None);
    }

    #[test]
    fn test_collect_directory_filters_unsupported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        fs::write(dir.path().join("image.png"), [0u8; 4]).unwrap();
        fs::write(dir.path().join("report.docx"), "stub").unwrap();

        let collector = FileCollector::with_defaults();
        let files = collector.collect_directory(dir.path()).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.kind != FileKind::Pdf));
    }

    #[test]
    fn test_collect_directory_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();

        let collector = FileCollector::with_defaults();
        let files = collector.collect_directory(dir.path()).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files[0].path < files[1].path);
    }

    #[test]
    fn test_collect_missing_directory_fails() {
        let collector = FileCollector::with_defaults();
        let result = collector.collect_directory(Path::new("/nonexistent/jarvis-data"));
        assert!(result.is_err());
    }

    #[test]
    fn test_size_filter() {
        let config = CollectorConfig {
            max_file_size: 4,
            ..Default::default()
        };
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("big.txt"), "more than four bytes").unwrap();
        fs::write(dir.path().join("ok.txt"), "ok").unwrap();

        let collector = FileCollector::new(config);
        let files = collector.collect_directory(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].path.ends_with("ok.txt"));
    }
}

//! PDF text extraction via pdf-extract.

use std::path::Path;

use anyhow::{Context, Result};

/// Extract text per page as (page number, text) pairs. Page numbers are
/// 1-based.
pub fn extract_pdf_pages(path: &Path) -> Result<Vec<(usize, String)>> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read PDF: {:?}", path))?;

    let text = pdf_extract::extract_text_from_mem(&bytes)
        .with_context(|| format!("Failed to extract text from PDF: {:?}", path))?;

    if text.trim().is_empty() {
        tracing::warn!(
            "No text extracted from PDF: {:?}. It might be a scanned document.",
            path
        );
        return Ok(vec![]);
    }

    Ok(split_pages(&text)
        .into_iter()
        .enumerate()
        .map(|(i, page)| (i + 1, page))
        .collect())
}

/// Split extracted text into pages. Tries the form-feed character first,
/// then a "--- Page N ---" separator pattern, then falls back to a single
/// page.
fn split_pages(text: &str) -> Vec<String> {
    let pages: Vec<String> = text
        .split('\x0c')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if pages.len() > 1 {
        return pages;
    }

    let page_pattern = regex::Regex::new(r"(?m)^[\s]*[-=]+[\s]*(?:Page[\s]*)?(\d+)[\s]*[-=]+[\s]*$")
        .expect("Invalid regex");

    if page_pattern.is_match(text) {
        let pages: Vec<String> = page_pattern
            .split(text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if pages.len() > 1 {
            return pages;
        }
    }

    vec![text.trim().to_string()]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pages_formfeed() {
        let text = "Page one content\x0cPage two content\x0cPage three content";
        let pages = split_pages(text);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0], "Page one content");
        assert_eq!(pages[2], "Page three content");
    }

    #[test]
    fn test_split_pages_separator_pattern() {
        let text = "Intro text\n--- Page 2 ---\nSecond page text";
        let pages = split_pages(text);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1], "Second page text");
    }

    #[test]
    fn test_split_pages_no_separator() {
        let text = "Just some text without page breaks";
        let pages = split_pages(text);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0], text);
    }

    #[test]
    fn test_extract_invalid_pdf_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, "definitely not a pdf").unwrap();
        assert!(extract_pdf_pages(&path).is_err());
    }
}

//! DOCX text extraction.
//!
//! A .docx file is a zip container; the document body lives in
//! `word/document.xml`. Text nodes are concatenated, with paragraph ends
//! (`</w:p>`) mapped to newlines and explicit breaks/tabs preserved.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Extract the plain text of a .docx file.
pub fn extract_docx_text(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open DOCX: {:?}", path))?;

    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Not a valid DOCX (zip) archive: {:?}", path))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .with_context(|| format!("DOCX missing word/document.xml: {:?}", path))?
        .read_to_string(&mut xml)
        .context("Failed to read document.xml")?;

    extract_text_from_document_xml(&xml)
}

/// Pull the readable text out of a WordprocessingML body.
fn extract_text_from_document_xml(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();

    loop {
        match reader.read_event().context("Malformed document.xml")? {
            Event::Text(t) => {
                let text = t.unescape().context("Invalid XML escape")?;
                out.push_str(&text);
            }
            Event::End(e) if e.name().as_ref() == b"w:p" => out.push('\n'),
            Event::Empty(e) => match e.name().as_ref() {
                b"w:br" => out.push('\n'),
                b"w:tab" => out.push('\t'),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out.trim().to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>
    <w:p><w:r><w:t>Second</w:t></w:r><w:r><w:t xml:space="preserve"> paragraph.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn test_extract_text_from_xml() {
        let text = extract_text_from_document_xml(SAMPLE_XML).unwrap();
        assert!(text.contains("First paragraph."));
        assert!(text.contains("Second paragraph."));
        // paragraphs separated by newline
        let first_line = text.lines().next().unwrap();
        assert!(first_line.contains("First paragraph."));
    }

    #[test]
    fn test_extract_docx_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sample.docx");

        let file = std::fs::File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file("word/document.xml", zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(SAMPLE_XML.as_bytes()).unwrap();
        zip.finish().unwrap();

        let text = extract_docx_text(&path).unwrap();
        assert!(text.contains("First paragraph."));
    }

    #[test]
    fn test_extract_docx_missing_document_xml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("empty.docx");

        let file = std::fs::File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file("other.xml", zip::write::FileOptions::default())
            .unwrap();
        zip.write_all(b"<x/>").unwrap();
        zip.finish().unwrap();

        assert!(extract_docx_text(&path).is_err());
    }
}

//! Text chunking
//!
//! Splits document text into retrieval-sized chunks. Splitting prefers
//! natural boundaries in a fallback cascade - paragraph, line, sentence,
//! word - and only cuts mid-word when a piece has no softer boundary left.
//! Separators stay attached to the preceding piece, so concatenating chunks
//! with overlap prefixes removed reconstructs the source text exactly.

use crate::error::RagError;
use crate::extractor::Document;

/// Boundary cascade, softest first. Hard character split is the final
/// fallback.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

// ============================================================================
// Chunk Configuration
// ============================================================================

/// Chunking settings. Sizes are in characters, not bytes.
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// Maximum chunk size.
    pub max_characters: usize,
    /// Overlap carried from the previous chunk into the next.
    pub overlap_characters: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_characters: 1000,
            overlap_characters: 100,
        }
    }
}

// ============================================================================
// Chunk
// ============================================================================

/// A bounded slice of a Document's text, carrying the parent's metadata.
/// Created during splitting, never mutated, consumed by the embedding step.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub text: String,
    pub source: String,
    pub page: Option<usize>,
}

// ============================================================================
// TextChunker
// ============================================================================

/// Recursive character splitter with a configurable overlap.
pub struct TextChunker {
    config: ChunkConfig,
}

impl TextChunker {
    /// Create a chunker, validating that overlap leaves room for content.
    pub fn new(config: ChunkConfig) -> Result<Self, RagError> {
        if config.max_characters == 0 {
            return Err(RagError::Config("chunk size must be positive".into()));
        }
        if config.overlap_characters >= config.max_characters {
            return Err(RagError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                config.overlap_characters, config.max_characters
            )));
        }
        Ok(Self { config })
    }

    pub fn with_defaults() -> Self {
        Self {
            config: ChunkConfig::default(),
        }
    }

    /// Split text into chunks of at most `max_characters` each, consecutive
    /// chunks sharing an `overlap_characters` boundary region. Empty or
    /// whitespace-only text yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return vec![];
        }

        let max = self.config.max_characters;
        let overlap = self.config.overlap_characters;

        // Exact partition into natural units, each within the size bound.
        let atoms = split_atoms(text, max, overlap, 0);

        let mut chunks: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for atom in atoms {
            let atom_len = char_len(&atom);

            if !current.is_empty() && current_len + atom_len > max {
                chunks.push(current.clone());

                // Carry the trailing overlap into the next chunk, trimmed if
                // the upcoming atom leaves no room (size bound wins).
                let carry = overlap.min(max.saturating_sub(atom_len));
                current = char_suffix(&current, carry).to_string();
                current_len = carry;
            }

            current.push_str(&atom);
            current_len += atom_len;
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }

    /// Chunk a Document, propagating its metadata into each Chunk.
    pub fn chunk_document(&self, doc: &Document) -> Vec<Chunk> {
        self.chunk(&doc.text)
            .into_iter()
            .map(|text| Chunk {
                text,
                source: doc.source.clone(),
                page: doc.page,
            })
            .collect()
    }
}

// ============================================================================
// Splitting helpers
// ============================================================================

/// Partition `text` into natural units of at most `budget` characters,
/// trying the separator at `level` and recursing to harder separators only
/// for parts that still exceed the budget. No merging happens here; the
/// caller assembles chunks with overlap accounting. Character-split runs
/// reserve `overlap` so the boundary carry is never trimmed to zero.
fn split_atoms(text: &str, budget: usize, overlap: usize, level: usize) -> Vec<String> {
    if char_len(text) <= budget {
        return vec![text.to_string()];
    }

    let Some(sep) = SEPARATORS.get(level) else {
        return hard_split(text, budget.saturating_sub(overlap).max(1));
    };

    let parts = split_keeping_separator(text, sep);
    if parts.len() <= 1 {
        return split_atoms(text, budget, overlap, level + 1);
    }

    let mut out: Vec<String> = Vec::new();
    for part in parts {
        if char_len(part) > budget {
            out.extend(split_atoms(part, budget, overlap, level + 1));
        } else {
            out.push(part.to_string());
        }
    }
    out
}

/// Split on `sep`, keeping the separator attached to the preceding part so
/// the parts concatenate back to the input exactly.
fn split_keeping_separator<'a>(text: &'a str, sep: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(sep) {
        let end = start + pos + sep.len();
        parts.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        parts.push(&text[start..]);
    }

    parts
}

/// Last-resort split into fixed-size character slices.
fn hard_split(text: &str, budget: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;

    for ch in text.chars() {
        if count == budget {
            out.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }

    if !current.is_empty() {
        out.push(current);
    }

    out
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The last `n` characters of `s` (UTF-8 boundary safe).
fn char_suffix(s: &str, n: usize) -> &str {
    let len = char_len(s);
    if n >= len {
        return s;
    }
    let skip = len - n;
    match s.char_indices().nth(skip) {
        Some((idx, _)) => &s[idx..],
        None => "",
    }
}

// ============================================================================
// Tests
// ============================================================================

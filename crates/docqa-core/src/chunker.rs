//! Splits document text into fixed-size overlapping windows.
//!
//! Windows are measured in Unicode scalar values (`char` count), never bytes,
//! so a window boundary can't land inside a multi-byte code point. Consecutive
//! windows from one document share exactly `chunk_overlap` characters; only
//! the final window may be shorter than `chunk_size`.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{Document, DocumentChunk};

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 150,
        }
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        let config = Self {
            chunk_size,
            chunk_overlap,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be positive".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Chunk every document, assigning ids of the form `<doc-stem>:<index>`.
pub fn chunk_documents(documents: &[Document], config: &ChunkingConfig) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();
    for document in documents {
        let stem = Path::new(&document.source_path)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "doc".to_string());
        for (i, window) in chunk_text(&document.raw_text, config).into_iter().enumerate() {
            chunks.push(DocumentChunk {
                id: format!("{}:{}", stem, i),
                source_path: document.source_path.clone(),
                chunk_index: i,
                content: window.to_string(),
            });
        }
    }
    chunks
}

/// Window `text` into overlapping slices. A text shorter than `chunk_size`
/// yields exactly one window equal to the full text; empty text yields none.
///
/// The caller is expected to have validated `config`.
pub fn chunk_text<'a>(text: &'a str, config: &ChunkingConfig) -> Vec<&'a str> {
    let offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let n = offsets.len();
    if n == 0 {
        return Vec::new();
    }
    let step = config.chunk_size - config.chunk_overlap;
    let mut windows = Vec::new();
    let mut start = 0usize;
    loop {
        let end = (start + config.chunk_size).min(n);
        let byte_start = offsets[start];
        let byte_end = if end == n { text.len() } else { offsets[end] };
        windows.push(&text[byte_start..byte_end]);
        if end == n {
            break;
        }
        start += step;
    }
    windows
}

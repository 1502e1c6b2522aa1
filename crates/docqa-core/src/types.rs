//! Domain types shared across the pipeline.

use serde::{Deserialize, Serialize};

/// A source file read in full, before chunking.
///
/// Produced once per file by the loader and consumed by the build pipeline;
/// only its chunks are persisted.
#[derive(Debug, Clone)]
pub struct Document {
    /// Path of the file this text was extracted from.
    pub source_path: String,
    /// Full extracted text.
    pub raw_text: String,
}

/// A window of a source document that is independently embedded and indexed.
///
/// - `id`: globally unique chunk identifier (`<doc-stem>:<chunk_index>`)
/// - `source_path`: original path to the source file
/// - `chunk_index`: position within the parent document
/// - `content`: the text payload of the chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub source_path: String,
    pub chunk_index: usize,
    pub content: String,
}

/// A retrieved chunk with its similarity score. Higher is always better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub id: String,
    pub source_path: String,
    pub chunk_index: usize,
    pub content: String,
    pub score: f32,
}

/// The result of one question. Transient; never persisted.
#[derive(Debug, Clone)]
pub struct Answer {
    pub question: String,
    pub result: String,
}

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Process configuration, resolved once at startup and passed by reference
/// from then on. Merge order: built-in defaults, then `docqa.toml`, then
/// `DOCQA_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory scanned recursively for .txt, .md, and .pdf files.
    pub docs_dir: PathBuf,
    /// Directory holding the persisted vector index.
    pub db_dir: PathBuf,
    /// Embedding model identifier, e.g. `nomic-embed-text`.
    pub embed_model: String,
    /// Generation model identifier, e.g. `llama3.2`.
    pub llm_model: String,
    /// Base URL of the Ollama-compatible HTTP service.
    pub ollama_url: String,
    /// Chunk window length, in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks. Must be < chunk_size.
    pub chunk_overlap: usize,
    /// How many chunks to retrieve per question.
    pub top_k: usize,
    /// Sampling temperature for answer generation.
    pub temperature: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
            db_dir: PathBuf::from("vector_db"),
            embed_model: "nomic-embed-text".to_string(),
            llm_model: "llama3.2".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            chunk_size: 800,
            chunk_overlap: 150,
            top_k: 4,
            temperature: 0.2,
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file("docqa.toml"))
            .merge(Env::prefixed("DOCQA_"))
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would corrupt chunking before any work is done.
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

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No .txt, .md, or .pdf files found in {0}. Add some to the docs folder.")]
    NoDocuments(String),

    #[error("Embedding model mismatch: index was built with '{built_with}' but '{requested}' is configured. Rebuild the index or change the configured model.")]
    ModelMismatch { built_with: String, requested: String },

    #[error("Index storage error: {0}")]
    Storage(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

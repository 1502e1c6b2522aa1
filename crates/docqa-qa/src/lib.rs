#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! Index lifecycle: decide between building a fresh index and reusing the
//! persisted one, and run the full build pipeline when needed.
//!
//! The lifecycle is a two-state machine. An index either needs building
//! (`rebuild` requested, or nothing persisted yet) or is ready to load.
//! There is no automatic staleness detection: a changed docs folder only
//! takes effect when the caller asks for a rebuild.

pub mod answer;

pub use answer::{answer, AnswerOptions};

use std::path::Path;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use docqa_core::chunker::{chunk_documents, ChunkingConfig};
use docqa_core::error::Error;
use docqa_core::loader::load_documents;
use docqa_core::traits::Embedder;
use docqa_vector::VectorStore;

/// Build or load the persisted index for `docs_dir` at `db_dir`.
///
/// The database directory is treated as exclusively owned by one process at
/// a time. Rebuilding while another session queries the same path is caller
/// misuse; nothing here locks against it.
pub async fn prepare_index(
    docs_dir: &Path,
    db_dir: &Path,
    embedder: &dyn Embedder,
    chunking: &ChunkingConfig,
    rebuild: bool,
) -> Result<VectorStore> {
    chunking.validate()?;
    if rebuild || !db_dir.is_dir() {
        if db_dir.is_dir() {
            info!(path = %db_dir.display(), "discarding persisted index");
            std::fs::remove_dir_all(db_dir)?;
        }
        match build_index(docs_dir, db_dir, embedder, chunking).await {
            Ok(store) => Ok(store),
            Err(e) => {
                // A failed build must not leave a half-written database that a
                // later run would mistake for a usable index.
                if db_dir.is_dir() {
                    if let Err(cleanup) = std::fs::remove_dir_all(db_dir) {
                        warn!(path = %db_dir.display(), error = %cleanup, "could not remove partial index");
                    }
                }
                Err(e)
            }
        }
    } else {
        let store = VectorStore::open(db_dir).await?;
        if store.model_id() != embedder.model_id() {
            return Err(Error::ModelMismatch {
                built_with: store.model_id().to_string(),
                requested: embedder.model_id().to_string(),
            }
            .into());
        }
        info!(path = %db_dir.display(), model = store.model_id(), "loaded persisted index");
        Ok(store)
    }
}

async fn build_index(
    docs_dir: &Path,
    db_dir: &Path,
    embedder: &dyn Embedder,
    chunking: &ChunkingConfig,
) -> Result<VectorStore> {
    info!(path = %docs_dir.display(), "loading documents");
    let documents = load_documents(docs_dir)?;
    if documents.is_empty() {
        return Err(Error::NoDocuments(docs_dir.display().to_string()).into());
    }
    info!(documents = documents.len(), "splitting into chunks");
    let chunks = chunk_documents(&documents, chunking);
    if chunks.is_empty() {
        return Err(Error::NoDocuments(docs_dir.display().to_string()).into());
    }

    info!(chunks = chunks.len(), model = embedder.model_id(), "embedding chunks");
    let pb = ProgressBar::new(chunks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%)")
            .unwrap()
            .progress_chars("#>-"),
    );
    let mut embeddings = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        embeddings.push(embedder.embed(&chunk.content).await?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let dim = embeddings[0].len();
    let store = VectorStore::create(db_dir, embedder.model_id(), dim).await?;
    store.add(&chunks, &embeddings).await?;
    info!(chunks = chunks.len(), path = %db_dir.display(), "index persisted");
    Ok(store)
}

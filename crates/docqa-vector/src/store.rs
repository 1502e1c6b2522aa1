//! Durable vector store over a LanceDB database directory.
//!
//! One store holds one `chunks` table plus a `meta` table naming the
//! embedding model that produced the vectors. The similarity metric is
//! LanceDB's L2 distance at both build and query time; hits are reported
//! with `score = 1.0 - distance` so higher is always better.

use std::path::Path;

use anyhow::{anyhow, Result};
use arrow_array::{
    FixedSizeListArray, Float32Array, Int32Array, RecordBatch, RecordBatchIterator, StringArray,
};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::Connection;
use tracing::info;

use docqa_core::error::Error;
use docqa_core::types::{DocumentChunk, ScoredChunk};

use crate::schema::chunks_schema;
use crate::table::{self, CHUNKS_TABLE, META_EMBED_DIM, META_EMBED_MODEL, META_TABLE};

const WRITE_BATCH: usize = 1000;

pub struct VectorStore {
    db: Connection,
    model_id: String,
    dim: usize,
}

impl VectorStore {
    /// Create a fresh store at `db_path`, recording the embedding model and
    /// dimensionality that every future entry and query must match.
    pub async fn create(db_path: &Path, model_id: &str, dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig("embedding dimension must be positive".into()).into());
        }
        std::fs::create_dir_all(db_path)?;
        let db = table::open_db(db_path.to_string_lossy().as_ref()).await?;
        table::ensure_table(&db, CHUNKS_TABLE, chunks_schema(dim as i32)).await?;
        table::set_meta(&db, META_EMBED_MODEL, model_id).await?;
        table::set_meta(&db, META_EMBED_DIM, &dim.to_string()).await?;
        Ok(Self {
            db,
            model_id: model_id.to_string(),
            dim,
        })
    }

    /// Load a persisted store. A missing or gutted database directory is a
    /// storage error, never an empty index.
    pub async fn open(db_path: &Path) -> Result<Self> {
        if !db_path.is_dir() {
            return Err(Error::Storage(format!(
                "no persisted index at {}",
                db_path.display()
            ))
            .into());
        }
        let db = table::open_db(db_path.to_string_lossy().as_ref()).await?;
        if !table::table_exists(&db, CHUNKS_TABLE).await?
            || !table::table_exists(&db, META_TABLE).await?
        {
            return Err(Error::Storage(format!(
                "index at {} is missing its tables; rebuild it",
                db_path.display()
            ))
            .into());
        }
        let model_id = table::get_meta(&db, META_EMBED_MODEL).await?.ok_or_else(|| {
            Error::Storage(format!(
                "index at {} does not record its embedding model; rebuild it",
                db_path.display()
            ))
        })?;
        let dim = table::get_meta(&db, META_EMBED_DIM)
            .await?
            .and_then(|v| v.parse::<usize>().ok())
            .ok_or_else(|| {
                Error::Storage(format!(
                    "index at {} has a corrupt embedding dimension; rebuild it",
                    db_path.display()
                ))
            })?;
        Ok(Self { db, model_id, dim })
    }

    /// Identifier of the embedding model this index was built with.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Embedding dimensionality of every vector in this index.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Append embedded chunks. Every vector must have the store's
    /// dimensionality; chunks and embeddings are parallel slices.
    pub async fn add(&self, chunks: &[DocumentChunk], embeddings: &[Vec<f32>]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        if chunks.len() != embeddings.len() {
            return Err(anyhow!(
                "chunks and embeddings length mismatch: {} vs {}",
                chunks.len(),
                embeddings.len()
            ));
        }
        for embedding in embeddings {
            if embedding.len() != self.dim {
                return Err(Error::InvalidConfig(format!(
                    "embedding dimension {} does not match index dimension {}",
                    embedding.len(),
                    self.dim
                ))
                .into());
            }
        }
        info!(chunks = chunks.len(), table = CHUNKS_TABLE, "writing chunks");
        for (chunk_slice, embedding_slice) in
            chunks.chunks(WRITE_BATCH).zip(embeddings.chunks(WRITE_BATCH))
        {
            let record_batch = self.to_record_batch(chunk_slice, embedding_slice)?;
            let schema = record_batch.schema();
            let reader = Box::new(RecordBatchIterator::new(
                vec![Ok(record_batch)].into_iter(),
                schema,
            ));
            self.db
                .open_table(CHUNKS_TABLE)
                .execute()
                .await?
                .add(reader)
                .execute()
                .await?;
        }
        Ok(())
    }

    /// Nearest neighbors of `query_vec`, closest first. Asking for more
    /// results than the index holds returns everything, ranked.
    pub async fn search(&self, query_vec: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        if query_vec.len() != self.dim {
            return Err(Error::InvalidConfig(format!(
                "query vector dimension {} does not match index dimension {}",
                query_vec.len(),
                self.dim
            ))
            .into());
        }
        let table = self.db.open_table(CHUNKS_TABLE).execute().await?;
        let mut stream = table
            .vector_search(query_vec.to_vec())?
            .limit(k)
            .execute()
            .await?;
        let mut results = Vec::new();
        while let Some(batch) = TryStreamExt::try_next(&mut stream).await? {
            for i in 0..batch.num_rows() {
                let id = string_col(&batch, "id")?.value(i).to_string();
                let source_path = string_col(&batch, "doc_path")?.value(i).to_string();
                let chunk_index = int_col(&batch, "chunk_index")?.value(i) as usize;
                let content = string_col(&batch, "content")?.value(i).to_string();
                let score = match batch
                    .column_by_name("_distance")
                    .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
                {
                    Some(distances) => 1.0 - distances.value(i),
                    None => 0.5,
                };
                results.push(ScoredChunk {
                    id,
                    source_path,
                    chunk_index,
                    content,
                    score,
                });
            }
        }
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);
        Ok(results)
    }

    fn to_record_batch(
        &self,
        chunks: &[DocumentChunk],
        embeddings: &[Vec<f32>],
    ) -> Result<RecordBatch> {
        let schema = chunks_schema(self.dim as i32);
        let mut ids = Vec::new();
        let mut doc_paths = Vec::new();
        let mut chunk_indices = Vec::new();
        let mut contents = Vec::new();
        let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::new();
        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            ids.push(chunk.id.clone());
            doc_paths.push(chunk.source_path.clone());
            chunk_indices.push(chunk.chunk_index as i32);
            contents.push(chunk.content.clone());
            vectors.push(Some(embedding.iter().map(|&x| Some(x)).collect()));
        }
        let record_batch = RecordBatch::try_new(
            schema,
            vec![
                std::sync::Arc::new(StringArray::from(ids)),
                std::sync::Arc::new(StringArray::from(doc_paths)),
                std::sync::Arc::new(Int32Array::from(chunk_indices)),
                std::sync::Arc::new(StringArray::from(contents)),
                std::sync::Arc::new(FixedSizeListArray::from_iter_primitive::<
                    arrow_array::types::Float32Type,
                    _,
                    _,
                >(vectors.into_iter(), self.dim as i32)),
            ],
        )?;
        Ok(record_batch)
    }
}

fn string_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow!("column '{}' missing or mistyped", name))
}

fn int_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Int32Array> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
        .ok_or_else(|| anyhow!("column '{}' missing or mistyped", name))
}

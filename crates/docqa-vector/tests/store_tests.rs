use docqa_core::error::Error;
use docqa_core::traits::Embedder;
use docqa_core::types::DocumentChunk;
use docqa_ollama::HashEmbedder;
use docqa_vector::VectorStore;

fn chunk(id: &str, index: usize, content: &str) -> DocumentChunk {
    DocumentChunk {
        id: id.to_string(),
        source_path: format!("/tmp/{}.txt", id),
        chunk_index: index,
        content: content.to_string(),
    }
}

async fn embed_all(embedder: &HashEmbedder, chunks: &[DocumentChunk]) -> Vec<Vec<f32>> {
    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    embedder.embed_batch(&texts).await.expect("embed")
}

#[tokio::test]
async fn search_ranks_lexically_similar_chunk_first() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let embedder = HashEmbedder::new(256);
    let chunks = vec![
        chunk("sky:0", 0, "The sky is blue."),
        chunk("grass:0", 0, "Grass is green."),
        chunk("compilers:0", 0, "Compilers translate programs into machine code."),
    ];
    let embeddings = embed_all(&embedder, &chunks).await;

    let store = VectorStore::create(tmp.path(), embedder.model_id(), embedder.dim()).await?;
    store.add(&chunks, &embeddings).await?;

    let query = embedder.embed("What color is the sky?").await?;
    let hits = store.search(&query, 4).await?;
    assert!(!hits.is_empty());
    assert!(
        hits[0].content.contains("sky"),
        "expected the sky chunk first, got {:?}",
        hits[0]
    );
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score, "hits must be ranked best first");
    }
    Ok(())
}

#[tokio::test]
async fn k_larger_than_index_size_returns_all_entries() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let embedder = HashEmbedder::new(64);
    let chunks: Vec<DocumentChunk> = (0..4)
        .map(|i| chunk(&format!("doc:{}", i), i, &format!("entry number {}", i)))
        .collect();
    let embeddings = embed_all(&embedder, &chunks).await;

    let store = VectorStore::create(tmp.path(), embedder.model_id(), embedder.dim()).await?;
    store.add(&chunks, &embeddings).await?;

    let query = embedder.embed("entry").await?;
    let hits = store.search(&query, 100).await?;
    assert_eq!(hits.len(), 4);
    Ok(())
}

#[tokio::test]
async fn persisted_index_round_trips_with_identical_ranking() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let embedder = HashEmbedder::new(128);
    let chunks = vec![
        chunk("a:0", 0, "rust ownership and borrowing"),
        chunk("b:0", 0, "gardening in raised beds"),
        chunk("c:0", 0, "sourdough starter maintenance"),
        chunk("d:0", 0, "borrow checker error messages"),
    ];
    let embeddings = embed_all(&embedder, &chunks).await;
    let query = embedder.embed("why does the borrow checker complain").await?;

    let before: Vec<String> = {
        let store = VectorStore::create(tmp.path(), embedder.model_id(), embedder.dim()).await?;
        store.add(&chunks, &embeddings).await?;
        store.search(&query, 4).await?.into_iter().map(|h| h.id).collect()
    };

    let reopened = VectorStore::open(tmp.path()).await?;
    assert_eq!(reopened.model_id(), embedder.model_id());
    assert_eq!(reopened.dim(), embedder.dim());
    let after: Vec<String> = reopened.search(&query, 4).await?.into_iter().map(|h| h.id).collect();
    assert_eq!(before, after);
    Ok(())
}

#[tokio::test]
async fn open_on_missing_path_is_a_storage_error() {
    let tmp = tempfile::tempdir().unwrap();
    let missing = tmp.path().join("never_built");
    let err = VectorStore::open(&missing).await.expect_err("must fail");
    match err.downcast_ref::<Error>() {
        Some(Error::Storage(_)) => {}
        other => panic!("expected a storage error, got {:?}", other),
    }
}

#[tokio::test]
async fn open_on_gutted_directory_is_a_storage_error() {
    let tmp = tempfile::tempdir().unwrap();
    // Directory exists but holds no tables.
    let err = VectorStore::open(tmp.path()).await.expect_err("must fail");
    match err.downcast_ref::<Error>() {
        Some(Error::Storage(_)) => {}
        other => panic!("expected a storage error, got {:?}", other),
    }
}

#[tokio::test]
async fn add_rejects_wrong_dimension() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = VectorStore::create(tmp.path(), "fake:8", 8).await?;
    let chunks = vec![chunk("a:0", 0, "text")];
    let err = store
        .add(&chunks, &[vec![0.0f32; 4]])
        .await
        .expect_err("dimension mismatch must fail");
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidConfig(_))));
    Ok(())
}

#[tokio::test]
async fn search_rejects_wrong_dimension() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = VectorStore::create(tmp.path(), "fake:8", 8).await?;
    let err = store.search(&[0.0f32; 4], 4).await.expect_err("must fail");
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::InvalidConfig(_))));
    Ok(())
}

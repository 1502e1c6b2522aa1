use docqa_core::traits::Embedder;
use docqa_ollama::{embedder_for, HashEmbedder, DEFAULT_BASE_URL};

#[tokio::test]
async fn hash_embedder_is_deterministic() {
    let embedder = HashEmbedder::new(64);
    let a = embedder.embed("The sky is blue.").await.unwrap();
    let b = embedder.embed("The sky is blue.").await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn hash_embedder_has_fixed_dimension() {
    let embedder = HashEmbedder::new(64);
    for text in ["one", "two words here", ""] {
        let v = embedder.embed(text).await.unwrap();
        assert_eq!(v.len(), 64);
    }
}

#[tokio::test]
async fn hash_embedder_favors_lexical_overlap() {
    let embedder = HashEmbedder::new(256);
    let query = embedder.embed("What color is the sky?").await.unwrap();
    let on_topic = embedder.embed("The sky is blue.").await.unwrap();
    let off_topic = embedder.embed("Compilers translate programs.").await.unwrap();

    let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
    assert!(
        dot(&query, &on_topic) > dot(&query, &off_topic),
        "shared tokens must pull vectors together"
    );
}

#[tokio::test]
async fn hash_embedder_normalizes_punctuation_and_case() {
    let embedder = HashEmbedder::new(128);
    let plain = embedder.embed("sky").await.unwrap();
    let decorated = embedder.embed("Sky?").await.unwrap();
    assert_eq!(plain, decorated);
}

#[test]
fn embedder_for_resolves_fake_ids() {
    let embedder = embedder_for("fake:32", DEFAULT_BASE_URL).unwrap();
    assert_eq!(embedder.model_id(), "fake:32");

    let embedder = embedder_for("fake", DEFAULT_BASE_URL).unwrap();
    assert_eq!(embedder.model_id(), "fake:256");

    assert!(embedder_for("fake:zero", DEFAULT_BASE_URL).is_err());
}

#[test]
fn embedder_for_passes_real_models_to_ollama() {
    let embedder = embedder_for("nomic-embed-text", DEFAULT_BASE_URL).unwrap();
    assert_eq!(embedder.model_id(), "nomic-embed-text");
}

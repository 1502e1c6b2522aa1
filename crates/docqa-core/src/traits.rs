use async_trait::async_trait;

/// Maps text to a fixed-dimension vector via an external embedding service.
///
/// Implementations must be deterministic for identical input and model id,
/// and must return vectors of the same dimensionality for the lifetime of
/// the value.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Identifier of the embedding model (e.g. `nomic-embed-text`). Recorded
    /// in the index so loads can detect a model switch.
    fn model_id(&self) -> &str;

    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

/// Produces completion text via an external language model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn model_id(&self) -> &str;

    async fn generate(&self, prompt: &str, temperature: f32) -> anyhow::Result<String>;
}

//! Deterministic offline embedder for tests and development.
//!
//! Buckets normalized tokens into a fixed-dimension vector by hash, then
//! L2-normalizes. Texts sharing words land near each other, which is enough
//! lexical signal for retrieval tests without a model server.

use std::hash::{Hash, Hasher};

use anyhow::{bail, Result};
use async_trait::async_trait;
use twox_hash::XxHash64;

use docqa_core::traits::Embedder;

const DEFAULT_DIM: usize = 256;

pub(crate) fn is_fake_model_id(model_id: &str) -> bool {
    model_id == "fake" || model_id.starts_with("fake:")
}

pub struct HashEmbedder {
    model_id: String,
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self {
            model_id: format!("fake:{}", dim),
            dim,
        }
    }

    /// Parse `fake` or `fake:<dim>` into an embedder.
    pub fn from_model_id(model_id: &str) -> Result<Self> {
        if model_id == "fake" {
            return Ok(Self::new(DEFAULT_DIM));
        }
        match model_id.strip_prefix("fake:").and_then(|d| d.parse::<usize>().ok()) {
            Some(dim) if dim > 0 => Ok(Self::new(dim)),
            _ => bail!("invalid fake embedder id '{}', expected fake:<dim>", model_id),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn embed_tokens(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        let tokens = text
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .filter(|t| !t.is_empty());
        for (i, token) in tokens.enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        v
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_tokens(text))
    }
}

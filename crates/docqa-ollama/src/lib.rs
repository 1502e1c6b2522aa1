#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! HTTP collaborators for an Ollama-compatible service.
//!
//! The pipeline never runs models itself; it talks to `/api/embeddings` and
//! `/api/generate` on a locally running service. Both calls are synchronous
//! request/response with no retries — failure causes (model not pulled,
//! service down) are not transient-by-default, so retry policy belongs to
//! the caller.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use docqa_core::traits::{Embedder, TextGenerator};

mod fake;

pub use fake::HashEmbedder;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Prompt used by the connectivity probe; the reply content is irrelevant,
/// only that the service answered.
const PROBE_PROMPT: &str = "Reply with one word: OK";

#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn embeddings(&self, model: &str, prompt: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&EmbeddingsRequest { model, prompt })
            .send()
            .await
            .map_err(|e| anyhow!("embedding request to {} failed: {}", url, e))?;
        if !response.status().is_success() {
            bail!(
                "embedding request for model '{}' returned HTTP {}",
                model,
                response.status()
            );
        }
        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("malformed embedding response for model '{}': {}", model, e))?;
        if body.embedding.is_empty() {
            bail!("model '{}' returned an empty embedding", model);
        }
        Ok(body.embedding)
    }

    pub async fn generate(&self, model: &str, prompt: &str, temperature: f32) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        debug!(model, prompt_chars = prompt.chars().count(), "generate request");
        let response = self
            .http
            .post(&url)
            .json(&GenerateRequest {
                model,
                prompt,
                stream: false,
                options: GenerateOptions { temperature },
            })
            .send()
            .await
            .map_err(|e| anyhow!("generation request to {} failed: {}", url, e))?;
        if !response.status().is_success() {
            bail!(
                "generation request for model '{}' returned HTTP {}",
                model,
                response.status()
            );
        }
        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| anyhow!("malformed generation response for model '{}': {}", model, e))?;
        Ok(body.response)
    }

    /// Round-trips a one-word prompt through `/api/generate` to confirm the
    /// service is up and the model is available.
    pub async fn connectivity_check(&self, model: &str) -> Result<String> {
        self.generate(model, PROBE_PROMPT, 0.0).await
    }
}

/// Embedder backed by the Ollama embeddings endpoint.
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: impl Into<String>) -> Self {
        Self {
            client: OllamaClient::new(base_url),
            model: model.into(),
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embeddings(&self.model, text).await
    }
}

/// Generator backed by the Ollama completion endpoint.
pub struct OllamaGenerator {
    client: OllamaClient,
    model: String,
}

impl OllamaGenerator {
    pub fn new(base_url: &str, model: impl Into<String>) -> Self {
        Self {
            client: OllamaClient::new(base_url),
            model: model.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        self.client.generate(&self.model, prompt, temperature).await
    }
}

/// Select an embedder from a model identifier. Ids of the form `fake:<dim>`
/// resolve to the offline hashing embedder; anything else is treated as an
/// Ollama model name.
pub fn embedder_for(model_id: &str, base_url: &str) -> Result<Box<dyn Embedder>> {
    if fake::is_fake_model_id(model_id) {
        return Ok(Box::new(HashEmbedder::from_model_id(model_id)?));
    }
    Ok(Box::new(OllamaEmbedder::new(base_url, model_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeddings_request_wire_shape() {
        let body = serde_json::to_value(EmbeddingsRequest {
            model: "nomic-embed-text",
            prompt: "hello",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"model": "nomic-embed-text", "prompt": "hello"})
        );
    }

    #[test]
    fn generate_request_wire_shape() {
        let body = serde_json::to_value(GenerateRequest {
            model: "llama3.2",
            prompt: "Q",
            stream: false,
            options: GenerateOptions { temperature: 0.2 },
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "llama3.2",
                "prompt": "Q",
                "stream": false,
                "options": {"temperature": 0.2f32}
            })
        );
    }

    #[test]
    fn responses_parse_from_service_json() {
        let e: EmbeddingsResponse =
            serde_json::from_str(r#"{"embedding": [0.1, 0.2, 0.3]}"#).unwrap();
        assert_eq!(e.embedding.len(), 3);

        let g: GenerateResponse = serde_json::from_str(
            r#"{"model": "llama3.2", "response": "Blue.", "done": true}"#,
        )
        .unwrap();
        assert_eq!(g.response, "Blue.");
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = OllamaClient::new("http://localhost:11434/");
        assert_eq!(client.base_url, "http://localhost:11434");
    }
}

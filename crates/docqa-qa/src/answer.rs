//! Retrieval and answer generation for a single question.

use anyhow::Result;
use tracing::debug;

use docqa_core::error::Error;
use docqa_core::traits::{Embedder, TextGenerator};
use docqa_core::types::{Answer, ScoredChunk};
use docqa_vector::VectorStore;

pub const DEFAULT_TOP_K: usize = 4;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone)]
pub struct AnswerOptions {
    pub top_k: usize,
    pub temperature: f32,
}

impl Default for AnswerOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Answer `question` against the persisted index.
///
/// Retrieval that comes back empty is not an error: the generator is still
/// called, just without grounding context.
pub async fn answer(
    question: &str,
    store: &VectorStore,
    embedder: &dyn Embedder,
    generator: &dyn TextGenerator,
    options: &AnswerOptions,
) -> Result<Answer> {
    if embedder.model_id() != store.model_id() {
        return Err(Error::ModelMismatch {
            built_with: store.model_id().to_string(),
            requested: embedder.model_id().to_string(),
        }
        .into());
    }
    let query_vec = embedder.embed(question).await?;
    let hits = store.search(&query_vec, options.top_k).await?;
    if hits.is_empty() {
        debug!("no chunks retrieved; answering without grounding");
    }
    let prompt = build_prompt(question, &hits);
    let result = generator.generate(&prompt, options.temperature).await?;
    Ok(Answer {
        question: question.to_string(),
        result,
    })
}

fn build_prompt(question: &str, hits: &[ScoredChunk]) -> String {
    let context: Vec<&str> = hits.iter().map(|h| h.content.as_str()).collect();
    format!(
        "Use the following pieces of context to answer the question at the end. \
         If you don't know the answer, just say that you don't know, don't try \
         to make up an answer.\n\n{}\n\nQuestion: {}\nHelpful Answer:",
        context.join("\n\n"),
        question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(content: &str, score: f32) -> ScoredChunk {
        ScoredChunk {
            id: "t:0".to_string(),
            source_path: "/tmp/t.txt".to_string(),
            chunk_index: 0,
            content: content.to_string(),
            score,
        }
    }

    #[test]
    fn prompt_places_context_before_the_literal_question() {
        let prompt = build_prompt(
            "What color is the sky?",
            &[hit("The sky is blue.", 0.9), hit("Grass is green.", 0.4)],
        );
        let context_pos = prompt.find("The sky is blue.").unwrap();
        let question_pos = prompt.find("Question: What color is the sky?").unwrap();
        assert!(context_pos < question_pos);
        assert!(prompt.contains("Grass is green."));
        assert!(prompt.ends_with("Helpful Answer:"));
    }

    #[test]
    fn prompt_with_no_hits_still_carries_the_question() {
        let prompt = build_prompt("Anything?", &[]);
        assert!(prompt.contains("Question: Anything?"));
        assert!(prompt.ends_with("Helpful Answer:"));
    }
}

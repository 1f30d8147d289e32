// Operation Service - Grouping and synthesis on top of the shared engine
//
// Flow per request: check the engine is ready, short-circuit trivial input,
// build the prompt, run one completion, interpret the reply. Malformed or
// missing model output degrades to a safe result instead of an error.

use std::sync::Arc;

use crate::error::LlmError;
use crate::llm::engine::ChatEngine;
use crate::llm::interpreter::{interpret_grouping, interpret_synthesis, Groups};
use crate::llm::lifecycle::EngineManager;
use crate::llm::prompts::{build_grouping_prompt, build_synthesis_prompt, Prompt};

/// Entry point for the two text operations
pub struct SentenceService {
    engine: Arc<EngineManager>,
}

impl SentenceService {
    pub fn new(engine: Arc<EngineManager>) -> Self {
        Self { engine }
    }

    /// Group sentences by semantic similarity.
    ///
    /// Every distinct input sentence appears in the result. When the model
    /// reply is empty or unparseable the whole input comes back as one group.
    pub async fn group_sentences(&self, sentences: &[String]) -> Result<Groups, LlmError> {
        let engine = self.engine.get()?;

        match sentences {
            [] => return Ok(Vec::new()),
            [single] => return Ok(vec![vec![single.clone()]]),
            _ => {}
        }

        let prompt = build_grouping_prompt(sentences);
        tracing::debug!("Sending grouping request for {} sentences", sentences.len());

        let response_text = match request_completion(engine.as_ref(), &prompt).await {
            Ok(text) => text,
            Err(LlmError::EmptyModelOutput) => {
                tracing::error!("LLM returned no content for grouping request");
                return Ok(vec![sentences.to_vec()]);
            }
            Err(e) => return Err(e),
        };

        match interpret_grouping(&response_text, sentences) {
            Ok(groups) => Ok(groups),
            Err(e) => {
                tracing::warn!("Failed to parse LLM grouping response, returning single group: {e}");
                Ok(vec![sentences.to_vec()])
            }
        }
    }

    /// Merge sentences into one paragraph. An empty model reply yields "".
    pub async fn synthesize(&self, sentences: &[String]) -> Result<String, LlmError> {
        let engine = self.engine.get()?;

        match sentences {
            [] => return Ok(String::new()),
            [single] => return Ok(single.clone()),
            _ => {}
        }

        let prompt = build_synthesis_prompt(sentences);
        tracing::debug!("Sending synthesis request for {} sentences", sentences.len());

        let content = match request_completion(engine.as_ref(), &prompt).await {
            Ok(text) => Some(text),
            Err(LlmError::EmptyModelOutput) => {
                tracing::warn!("LLM returned no content, returning empty paragraph");
                None
            }
            Err(e) => return Err(e),
        };

        let paragraph = interpret_synthesis(content.as_deref());
        tracing::debug!("Synthesized paragraph_len={}", paragraph.len());
        Ok(paragraph)
    }
}

/// Run one non-streaming completion, turning a content-less reply into
/// `EmptyModelOutput`
async fn request_completion(engine: &dyn ChatEngine, prompt: &Prompt) -> Result<String, LlmError> {
    let content = engine.chat(&prompt.to_messages()).await?;

    match content {
        Some(text) => {
            tracing::debug!("LLM response_len={}", text.len());
            Ok(text)
        }
        None => Err(LlmError::EmptyModelOutput),
    }
}

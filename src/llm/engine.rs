// LLM Engine - Chat-completion boundary and the mistral.rs backend
//
// The rest of the crate only sees `ChatEngine` and `EngineFactory`.
// The mistral.rs implementation is compiled with the `llm` feature; without
// it the factory refuses to build, so the server fails at startup.

use std::sync::Arc;

use async_trait::async_trait;

#[cfg(feature = "llm")]
use mistralrs::{GgufModelBuilder, Model, RequestBuilder, TextMessageRole, TextMessages};

use crate::error::LlmError;
use crate::llm::config::{InferenceSettings, ModelSource};

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
}

/// A single role-tagged message sent to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Compute device requested at construction time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    /// Best accelerator compiled into the backend, CPU otherwise
    Auto,
    /// Force CPU inference
    Cpu,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Cpu => "cpu",
        }
    }
}

/// A loaded model that answers non-streaming chat completions.
///
/// Resources are released when the last `Arc` to the engine is dropped.
#[async_trait]
pub trait ChatEngine: Send + Sync {
    /// Identifier of the model the engine was built from
    fn model_id(&self) -> &str;

    /// Run one chat completion.
    ///
    /// `Ok(None)` means the engine answered without any content.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Option<String>, LlmError>;
}

/// Builds engines; construction may download and load weights
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn build(
        &self,
        source: &ModelSource,
        device: Device,
    ) -> Result<Arc<dyn ChatEngine>, LlmError>;
}

/// Chat engine backed by a GGUF model loaded through mistral.rs
#[cfg(feature = "llm")]
pub struct MistralEngine {
    model: Model,
    model_id: String,
    settings: InferenceSettings,
}

#[cfg(feature = "llm")]
#[async_trait]
impl ChatEngine for MistralEngine {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<Option<String>, LlmError> {
        let messages = messages
            .iter()
            .fold(TextMessages::new(), |acc, message| {
                let role = match message.role {
                    ChatRole::System => TextMessageRole::System,
                    ChatRole::User => TextMessageRole::User,
                };
                acc.add_message(role, &message.content)
            });

        let request = RequestBuilder::from(messages)
            .set_sampler_max_len(self.settings.max_tokens as usize)
            .set_sampler_temperature(f64::from(self.settings.temperature))
            .set_sampler_topk(self.settings.top_k as usize)
            .set_sampler_topp(f64::from(self.settings.top_p));

        let response = self
            .model
            .send_chat_request(request)
            .await
            .map_err(|e| LlmError::Generation(e.to_string()))?;

        Ok(response
            .choices
            .first()
            .and_then(|c| c.message.content.clone()))
    }
}

/// Factory for mistral.rs engines
#[cfg(feature = "llm")]
pub struct MistralEngineFactory {
    settings: InferenceSettings,
}

#[cfg(feature = "llm")]
impl MistralEngineFactory {
    pub fn new(settings: InferenceSettings) -> Self {
        Self { settings }
    }
}

#[cfg(feature = "llm")]
#[async_trait]
impl EngineFactory for MistralEngineFactory {
    async fn build(
        &self,
        source: &ModelSource,
        device: Device,
    ) -> Result<Arc<dyn ChatEngine>, LlmError> {
        let mut builder =
            GgufModelBuilder::new(source.repo.clone(), vec![source.filename.clone()]).with_logging();
        if device == Device::Cpu {
            builder = builder.with_force_cpu();
        }

        let model = builder
            .build()
            .await
            .map_err(|e| LlmError::EngineConstruction(format!("{} on {}: {e}", source.id, device.as_str())))?;

        Ok(Arc::new(MistralEngine {
            model,
            model_id: source.id.clone(),
            settings: self.settings.clone(),
        }))
    }
}

/// Stub factory when the `llm` feature is disabled
#[cfg(not(feature = "llm"))]
pub struct MistralEngineFactory {
    _settings: InferenceSettings,
}

#[cfg(not(feature = "llm"))]
impl MistralEngineFactory {
    pub fn new(settings: InferenceSettings) -> Self {
        Self { _settings: settings }
    }
}

#[cfg(not(feature = "llm"))]
#[async_trait]
impl EngineFactory for MistralEngineFactory {
    async fn build(
        &self,
        _source: &ModelSource,
        _device: Device,
    ) -> Result<Arc<dyn ChatEngine>, LlmError> {
        Err(LlmError::EngineConstruction(
            "LLM feature not enabled".to_string(),
        ))
    }
}

// LLM Module - Everything that touches the language model
//
// Engine construction and lifetime, prompt templates, and interpretation
// of the model's free-form replies.

pub mod config;
pub mod engine;
pub mod interpreter;
pub mod lifecycle;
pub mod prompts;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{InferencePreset, InferenceSettings, ModelConfig, ModelSource, AVAILABLE_MODELS};
pub use engine::{ChatEngine, ChatMessage, ChatRole, Device, EngineFactory, MistralEngineFactory};
pub use interpreter::{interpret_grouping, interpret_synthesis, Groups};
pub use lifecycle::{EngineManager, EngineStatus};
pub use prompts::{build_grouping_prompt, build_synthesis_prompt, Prompt};

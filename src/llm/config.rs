// LLM Configuration - Model catalog and inference settings
//
// Defines the small chat models the service knows how to load and the
// sampling presets used for every completion.

use crate::error::LlmError;

/// Configuration for a downloadable GGUF model
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub id: &'static str,
    pub name: &'static str,
    pub repo: &'static str,
    pub filename: &'static str,
    pub context_length: u32,
    pub description: &'static str,
}

impl ModelConfig {
    /// One-line description for startup logs
    pub fn summary(&self) -> String {
        format!(
            "{} ({} token context): {}",
            self.name, self.context_length, self.description
        )
    }
}

/// Models that can be selected by id.
/// Quantization is pinned by filename so a given id always loads the same weights.
pub static AVAILABLE_MODELS: &[ModelConfig] = &[
    ModelConfig {
        id: "qwen3-0.6b",
        name: "Qwen3 0.6B",
        repo: "unsloth/Qwen3-0.6B-GGUF",
        filename: "Qwen3-0.6B-Q4_K_M.gguf",
        context_length: 32768,
        description: "Small multilingual model, fast enough for CPU-only hosts.",
    },
    ModelConfig {
        id: "qwen2.5-0.5b",
        name: "Qwen 2.5 0.5B Instruct",
        repo: "Qwen/Qwen2.5-0.5B-Instruct-GGUF",
        filename: "qwen2.5-0.5b-instruct-q4_k_m.gguf",
        context_length: 32768,
        description: "Smallest instruct model in the catalog. Weaker JSON discipline.",
    },
    ModelConfig {
        id: "tinyllama-1.1b",
        name: "TinyLlama 1.1B Chat",
        repo: "TheBloke/TinyLlama-1.1B-Chat-v1.0-GGUF",
        filename: "tinyllama-1.1b-chat-v1.0.Q4_K_M.gguf",
        context_length: 2048,
        description: "English-only chat model with a short context window.",
    },
];

/// Get model config by ID
pub fn get_model_config(id: &str) -> Option<&'static ModelConfig> {
    AVAILABLE_MODELS.iter().find(|m| m.id == id)
}

/// Get the default model ID
pub fn default_model_id() -> &'static str {
    "qwen3-0.6b"
}

/// Where the weights for a model identifier come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSource {
    /// The identifier exactly as requested
    pub id: String,
    /// Hugging Face repository holding the GGUF file
    pub repo: String,
    pub filename: String,
}

impl ModelSource {
    /// Resolve a model identifier.
    ///
    /// Accepts a catalog id (`qwen3-0.6b`) or an explicit
    /// `<hub-repo>:<file.gguf>` pair for weights outside the catalog.
    pub fn resolve(id: &str) -> Result<Self, LlmError> {
        let id = id.trim();

        if let Some(config) = get_model_config(id) {
            return Ok(Self {
                id: id.to_string(),
                repo: config.repo.to_string(),
                filename: config.filename.to_string(),
            });
        }

        match id.split_once(':') {
            Some((repo, filename))
                if repo.contains('/') && filename.to_ascii_lowercase().ends_with(".gguf") =>
            {
                Ok(Self {
                    id: id.to_string(),
                    repo: repo.to_string(),
                    filename: filename.to_string(),
                })
            }
            _ => Err(LlmError::UnknownModel(id.to_string())),
        }
    }
}

/// Inference preset for the speed/quality tradeoff
///
/// - **Fast**: shorter outputs, more deterministic
/// - **Balanced**: default
/// - **Quality**: longer outputs for large sentence lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum InferencePreset {
    Fast,
    #[default]
    Balanced,
    Quality,
}

impl InferencePreset {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Fast => "Fast",
            Self::Balanced => "Balanced",
            Self::Quality => "Quality",
        }
    }
}

/// LLM sampling settings
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceSettings {
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Temperature for sampling (0.0 = deterministic)
    pub temperature: f32,
    /// Top-p sampling threshold (nucleus sampling)
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self::from(InferencePreset::Balanced)
    }
}

impl From<InferencePreset> for InferenceSettings {
    fn from(preset: InferencePreset) -> Self {
        match preset {
            InferencePreset::Fast => Self {
                max_tokens: 512,
                temperature: 0.2,
                top_p: 0.85,
                top_k: 40,
            },
            InferencePreset::Balanced => Self {
                max_tokens: 1024,     // Grouping echoes every sentence back
                temperature: 0.3,
                top_p: 0.9,
                top_k: 50,
            },
            InferencePreset::Quality => Self {
                max_tokens: 2048,
                temperature: 0.1,     // More deterministic = steadier JSON
                top_p: 0.95,
                top_k: 50,
            },
        }
    }
}

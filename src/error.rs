// Error types - Failure kinds shared by the engine, service and HTTP layers

use thiserror::Error;

/// Failures that can cross from the LLM layer into the operation service.
///
/// `EmptyModelOutput` never reaches HTTP callers: the service recovers from
/// it locally. `NotInitialized` maps to 503, everything else to 500.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("LLM engine not initialized")]
    NotInitialized,

    #[error("LLM returned empty response")]
    EmptyModelOutput,

    #[error("failed to construct LLM engine: {0}")]
    EngineConstruction(String),

    #[error("unknown model: {0}")]
    UnknownModel(String),

    #[error("generation failed: {0}")]
    Generation(String),
}

impl LlmError {
    /// True when the engine is outside its ready window
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::NotInitialized)
    }
}

/// Why a grouping response could not be turned into groups
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no JSON found in response")]
    NoJsonFound,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("JSON value is not an array")]
    NotAnArray,
}

// Semantic Sentence - Sentence grouping and paragraph synthesis with a local LLM
//
// The `llm` module owns the model; `service` turns it into the two text
// operations; `server` exposes them over HTTP.

pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod server;
pub mod service;

pub use error::{LlmError, ParseError};
pub use service::SentenceService;

//! Process configuration from command-line flags and environment

use std::net::SocketAddr;

use clap::Parser;

use crate::llm::config::{InferencePreset, InferenceSettings};

#[derive(Debug, Clone, Parser)]
#[command(name = "semantic-sentence-api")]
#[command(
    version,
    about = "Semantic sentence grouping and paragraph synthesis over HTTP"
)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "SEMANTIC_SENTENCE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "SEMANTIC_SENTENCE_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Catalog model id or `<hub-repo>:<file.gguf>`; defaults to the catalog default
    #[arg(long, env = "SEMANTIC_SENTENCE_MODEL")]
    pub model: Option<String>,

    /// Sampling preset
    #[arg(long, env = "SEMANTIC_SENTENCE_PRESET", value_enum, default_value = "balanced")]
    pub preset: InferencePreset,

    /// Log level used when RUST_LOG is unset
    #[arg(long, env = "SEMANTIC_SENTENCE_LOG", default_value = "info")]
    pub log_level: String,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn inference_settings(&self) -> InferenceSettings {
        self.preset.into()
    }
}

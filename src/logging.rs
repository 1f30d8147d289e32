//! Logging initialisation via tracing-subscriber.
//!
//! `RUST_LOG` takes precedence; the configured level is the fallback.
//! Both accept full `EnvFilter` directives such as `info,hyper=warn`.

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Call once, before the engine is built.
pub fn init(level: &str) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(rust_log.as_deref(), level)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("failed to set subscriber: {e}"))
}

/// Pick the filter: a valid `RUST_LOG` wins, otherwise `level` must parse.
pub fn build_filter(rust_log: Option<&str>, level: &str) -> Result<EnvFilter> {
    if let Some(filter) = rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
    {
        return Ok(filter);
    }

    if level.trim().is_empty() {
        return Err(anyhow!("log level must not be empty"));
    }
    EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))
}

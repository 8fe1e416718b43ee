//! Shared wiring for the sigbyte binaries
//!
//! - Interactive operator input with re-prompting (`prompt`)
//! - Logging setup
//! - Configuration discovery

mod prompt;

pub use prompt::*;

use anyhow::{Context, Result};
use sigbyte_config::{load_config, load_config_or_default, LinkConfig};
use sigbyte_util::config_path_without_env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize logging to stderr; stdout carries the protocol output.
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the link configuration.
///
/// An explicitly given file must exist; the default location is optional.
pub fn load_link_config(explicit: Option<&Path>) -> Result<LinkConfig> {
    match explicit {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path)),
        None => {
            let path = config_path_without_env();
            load_config_or_default(&path)
                .with_context(|| format!("Failed to load config from {:?}", path))
        }
    }
}

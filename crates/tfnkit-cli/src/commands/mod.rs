//! CLI command implementations

use std::path::Path;

use anyhow::{Context, Result};
use tfnkit_core::config::ALL_BUILTINS;
use tfnkit_core::{Engine, EngineConfig};

pub mod apply;
pub mod eval;
pub mod transforms;
pub mod validate;

/// Config path used when `--config` is not given
pub const DEFAULT_CONFIG: &str = tfnkit_core::config::CONFIG_FILE;

/// Load configuration.
///
/// When the default file is absent every builtin is registered.
pub fn load_config(config_path: &str) -> Result<EngineConfig> {
    if config_path == DEFAULT_CONFIG && !Path::new(config_path).exists() {
        tracing::debug!("no {} found, registering all builtins", DEFAULT_CONFIG);
        return Ok(EngineConfig {
            builtins: vec![ALL_BUILTINS.to_string()],
            ..Default::default()
        });
    }
    EngineConfig::load(config_path)
        .with_context(|| format!("Failed to load configuration from {config_path}"))
}

/// Build an engine from the configuration at `config_path`
pub fn load_engine(config_path: &str) -> Result<Engine> {
    let config = load_config(config_path)?;
    Engine::new(config).context("Failed to create engine")
}

//! Engine configuration
//!
//! Configuration is read from `tfnkit.yaml`. Every key is optional.
//!
//! # Example
//!
//! ```yaml
//! # Byte budget for transform names held by the engine
//! registry_arena_limit: 65536
//!
//! # Byte budget for each transaction
//! transaction_arena_limit: 1048576
//!
//! chain:
//!   on_step_error: skip   # or: fail
//!
//! builtins:
//!   - lowercase
//!   - compressWhitespace
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::builtins;
use crate::chain::ChainPolicy;
use crate::error::{Error, Result};

/// Default configuration file name
pub const CONFIG_FILE: &str = "tfnkit.yaml";

/// Registers every standard transform when listed under `builtins`
pub const ALL_BUILTINS: &str = "all";

/// Engine configuration from `tfnkit.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EngineConfig {
    /// Byte budget of the arena holding registered transform names
    #[serde(default)]
    pub registry_arena_limit: Option<usize>,

    /// Byte budget of each transaction arena
    #[serde(default)]
    pub transaction_arena_limit: Option<usize>,

    /// Chain evaluation settings
    #[serde(default)]
    pub chain: ChainConfig,

    /// Standard transforms to register at startup (`all` for every one)
    #[serde(default)]
    pub builtins: Vec<String>,
}

/// Chain evaluation settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ChainConfig {
    /// What to do with a step that cannot be resolved or fails
    #[serde(default)]
    pub on_step_error: ChainPolicy,
}

impl EngineConfig {
    /// Load configuration from a directory or file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a directory containing `tfnkit.yaml`, or to the
    ///   file itself
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = EngineConfig::load("./rules")?;
    /// let engine = Engine::new(config)?;
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_path = if path.is_dir() {
            path.join(CONFIG_FILE)
        } else {
            path.to_path_buf()
        };

        if !config_path.exists() {
            return Err(Error::ConfigNotFound {
                path: config_path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(&config_path)?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check limits and builtin names
    pub fn validate(&self) -> Result<()> {
        for (key, limit) in [
            ("registry_arena_limit", self.registry_arena_limit),
            ("transaction_arena_limit", self.transaction_arena_limit),
        ] {
            if limit == Some(0) {
                return Err(Error::ConfigInvalid {
                    message: format!("{key} must be greater than zero"),
                });
            }
        }

        for name in &self.builtins {
            if name != ALL_BUILTINS && !builtins::names().any(|b| b == name.as_str()) {
                return Err(Error::ConfigInvalid {
                    message: format!("unknown builtin transform '{name}'"),
                });
            }
        }
        Ok(())
    }

    /// Builtin transform names to register, expanded and deduplicated
    pub fn builtin_names(&self) -> Vec<&str> {
        if self.builtins.iter().any(|b| b == ALL_BUILTINS) {
            return builtins::names().collect();
        }
        let mut names: Vec<&str> = Vec::new();
        for name in &self.builtins {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }
}

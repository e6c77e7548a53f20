//! Configuration module for flowbench
//!
//! The engine reads one TOML file with three tables: `[logging]`,
//! `[validation]` and `[execution]`. Every key is optional.
//!
//! # Config Location
//!
//! Unless a path is given explicitly, the file is looked up in the
//! platform-appropriate config directory:
//! - **Linux**: `~/.config/flowbench/flowbench.toml`
//! - **macOS**: `~/Library/Application Support/flowbench/flowbench.toml`
//! - **Windows**: `%APPDATA%\flowbench\flowbench.toml`
//!
//! # Example
//!
//! ```toml
//! [logging]
//! filter = "info,flowbench=trace"
//! directory = "logs"
//!
//! [validation]
//! strict = true
//!
//! [execution]
//! invocations = 5
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{FlowError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "flowbench";

/// Config filename
pub const CONFIG_FILE: &str = "flowbench.toml";

/// Get the default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID).join(CONFIG_FILE))
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub logging: LoggingConfig,
    pub validation: ValidationConfig,
    pub execution: ExecutionConfig,
}

impl EngineConfig {
    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| FlowError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Render as a TOML document
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| FlowError::Serialization(format!("Failed to serialize config: {}", e)))
    }

    /// Load a config file; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(FlowError::from)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Failed to load {}", path.display()))
    }

    /// Load from `path` or the default location.
    ///
    /// Without any location the defaults are returned; a file that exists
    /// but cannot be read or parsed is an error, left for the caller to log.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Save as TOML, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)
                    .map_err(FlowError::from)
                    .context("Failed to create config directory")?;
            }
        }

        std::fs::write(path, self.to_toml()?)
            .map_err(FlowError::from)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

//! Settings sections of the engine configuration
//!
//! Each section is a plain serde struct with `#[serde(default)]`, so a
//! configuration file only needs to name the values it changes.
//!
//! # Main Types
//!
//! - [`LoggingConfig`] - Log filter and optional rolling log files
//! - [`ValidationConfig`] - How strictly flows are checked before a sweep
//! - [`ExecutionConfig`] - Workload invocations and sweep bookkeeping

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default `tracing` filter when neither `RUST_LOG` nor the file sets one
pub const DEFAULT_LOG_FILTER: &str = "info,flowbench=debug";

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,

    /// Directory for daily rolling log files; `None` logs to stderr only
    pub directory: Option<PathBuf>,

    /// File name prefix of the rolling log files
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            directory: None,
            file_prefix: "flowbench.log".to_string(),
        }
    }
}

/// Validation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Treat validation warnings (unused outputs, multiply fed inputs) as errors
    pub strict: bool,

    /// Check bound input values against declared types before each run
    pub check_values: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict: false,
            check_values: true,
        }
    }
}

/// Execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// How many times the workload is invoked before the client sweep
    pub invocations: u32,

    /// Reset the flow's elements once a sweep finished
    pub reset_after_sweep: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            invocations: 1,
            reset_after_sweep: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let validation = ValidationConfig::default();
        assert!(!validation.strict);
        assert!(validation.check_values);
        assert_eq!(ExecutionConfig::default().invocations, 1);
        assert_eq!(LoggingConfig::default().filter, DEFAULT_LOG_FILTER);
    }
}

//! `clausal.toml` configuration.
//!
//! Every section and field is optional; a missing file means defaults.
//!
//! ```toml
//! [logging]
//! level = "warn"
//! format = "plain"
//!
//! [eval]
//! strict_references = false
//! ```

use std::path::{Path, PathBuf};

use clausal_eval::EvalOptions;
use serde::Deserialize;

/// File looked up in the working directory when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "clausal.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub logging: LoggingConfig,
    pub eval: EvalOptions,
}

/// Logging configuration. `RUST_LOG`, when set, wins over `level`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"warn,clausal_eval=debug"`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Plain,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LogFormat {
    Plain,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("could not read '{}': {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse '{}': {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid log filter '{directive}': {message}")]
    LogFilter { directive: String, message: String },
}

impl Config {
    /// Load from `path`, or from `./clausal.toml` when it exists, or fall
    /// back to defaults. An explicit path that cannot be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Config::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }
}

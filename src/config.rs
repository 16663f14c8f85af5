//! Optional TOML defaults, overridden by command-line flags.
//!
//! ```toml
//! target = "lapc"
//! mode = "known-only"        # or "replace-all"
//! model = "openai/gpt-4o"
//! operators = ["rivera", "chen"]
//! polish_command = ["llm-rewrite", "--quiet"]
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::rewrite::Mode;

/// Model name forwarded to the text rewriter when none is configured.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Institution id or name to rebrand toward.
    pub target: Option<String>,
    pub mode: Option<Mode>,
    pub model: Option<String>,
    /// Operators allowed to run course updates. Empty admits anyone.
    pub operators: Vec<String>,
    /// External program (plus arguments) used as the text rewriter.
    pub polish_command: Vec<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Flag value if given, else the configured one, else the default.
    pub fn mode_or(&self, flag: Option<Mode>) -> Mode {
        flag.or(self.mode).unwrap_or_default()
    }

    pub fn model_or(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub fn target_or(&self, flag: Option<String>) -> Option<String> {
        flag.or_else(|| self.target.clone())
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML content did not match the configuration schema
    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML content did not match the configuration schema
    #[error("Invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file extension names no supported format
    #[error("Unsupported config format '{0}': expected .yaml, .yml or .toml")]
    UnsupportedFormat(String),

    /// A value parsed but is outside its allowed range
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

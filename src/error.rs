//! Error types for configuration loading and parameter resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, importing or resolving a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    // Parameter errors
    #[error("You have requested a non-existent parameter \"{key}\".")]
    ParameterNotFound { key: String },

    #[error("{}", circular_message(.chain))]
    CircularReference { chain: Vec<String> },

    #[error(
        "A string value must be composed of strings and/or numbers, but found parameter \"{key}\" of type {found} inside string value \"{value}\"."
    )]
    InterpolationType {
        key: String,
        found: &'static str,
        value: String,
    },

    #[error("The \"{key}\" block must be a mapping")]
    InvalidParameters { key: String },

    // Import errors
    #[error("Invalid import in {file}: {reason}")]
    InvalidImport { file: PathBuf, reason: String },

    #[error("Circular import detected: {}", display_chain(.chain))]
    ImportCycle { chain: Vec<PathBuf> },

    // File collaborator errors
    #[error("Configuration file {0} does not contain a mapping")]
    NotAMapping(PathBuf),

    #[error("No loader supports the file {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn not_found(key: &str) -> Self {
        Self::ParameterNotFound {
            key: key.to_string(),
        }
    }
}

fn circular_message(chain: &[String]) -> String {
    let first = chain.first().map(String::as_str).unwrap_or_default();
    let path = chain
        .iter()
        .map(|key| format!("\"{}\"", key))
        .collect::<Vec<_>>()
        .join(" > ");
    format!(
        "Circular reference detected for parameter \"{}\" ({}).",
        first, path
    )
}

fn display_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

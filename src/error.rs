//! Error types for dacpac-lifecycle

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised by the script post-processing engine
#[derive(Debug, Error)]
pub enum ScriptError {
    /// A modifier needs project metadata that was never loaded
    #[error("The project property '{property}' must be set")]
    MissingProjectProperty { property: &'static str },

    #[error("Failed to read deploy script: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write deploy script: {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the production collaborators (subprocesses, DACPAC files)
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with code {code}: {stderr}")]
    Exit {
        program: String,
        code: i32,
        stderr: String,
    },

    #[error("{program} timed out after {secs} seconds")]
    Timeout { program: String, secs: u64 },

    #[error("Failed to read DACPAC {path}: {message}")]
    Dacpac { path: PathBuf, message: String },
}


//! Error types for Troubadour.

use std::path::PathBuf;
use thiserror::Error;

/// Inventory collection failure. Fatal to the session.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("No processor or memory information could be collected")]
    Empty,

    #[error("Inventory worker failed: {0}")]
    Worker(String),
}

/// Qualification record emission failure. Fatal to the session.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Cannot create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write log file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot serialize qualification record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Session has no inventory snapshot")]
    MissingSnapshot,
}

/// Configuration load or validation failure.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Failure to hand a reboot/power-off command to the OS.
#[derive(Error, Debug)]
pub enum PowerError {
    #[error("Power command is empty")]
    EmptyCommand,

    #[error("Cannot spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl RecordError {
    /// Short, operator-facing cause line
    pub fn operator_message(&self) -> String {
        match self {
            RecordError::CreateDir { path, source } => {
                format!("log directory {} could not be created ({})", path.display(), source)
            }
            RecordError::Write { path, source } => {
                format!("log file {} could not be written ({})", path.display(), source)
            }
            other => other.to_string(),
        }
    }
}

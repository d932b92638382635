//! Error types for the runner.

use std::io;
use std::path::PathBuf;

use loralink_node::{ConfigError, RadioError, SendError};
use thiserror::Error;

/// Errors that stop the runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid YAML for [`crate::RunnerConfig`].
    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A configuration value was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The radio could not be brought up. The node does not start.
    #[error("cannot start node: {0}")]
    RadioInit(#[source] RadioError),

    /// A one-shot send failed.
    #[error(transparent)]
    Send(#[from] SendError),

    /// A command-line argument was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The Ctrl-C handler could not be installed.
    #[error("failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Result type alias for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;

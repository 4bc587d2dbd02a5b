//! CLI error types.

use thiserror::Error;

use crate::config::ConfigError;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration is invalid or could not be read.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The logging subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),

    /// A `--arg` value was not in `key=value` form.
    #[error("invalid --arg '{0}': expected key=value")]
    InvalidArg(String),

    /// An error occurred in the bridge runtime.
    #[error(transparent)]
    Bridge(#[from] bridge::Error),

    /// A tool invoked directly from the command line failed.
    #[error(transparent)]
    Tool(#[from] bridge::DispatchError),

    /// A response could not be serialized for printing.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

use romid_dat::DatError;
use romid_lib::IdentifyError;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Identification failed
    #[error("{0}")]
    Identify(#[from] IdentifyError),

    /// Table import or update failed
    #[error("Table error: {0}")]
    Dat(#[from] DatError),

    /// JSON output could not be produced
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No plugin for the requested file or platform
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub(crate) fn unknown_platform(msg: impl Into<String>) -> Self {
        Self::UnknownPlatform(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub(crate) fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

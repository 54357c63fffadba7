use std::path::PathBuf;

use romid_core::AnalysisError;
use romid_dat::DatError;

/// Errors surfaced by file identification and settings handling.
#[derive(Debug, thiserror::Error)]
pub enum IdentifyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Table error: {0}")]
    Dat(#[from] DatError),

    #[error("No plugin registered for '{0}'")]
    NoPlugin(String),

    #[error("No ROM member for this platform in {}", .0.display())]
    NoMember(PathBuf),

    #[error("Settings error: {0}")]
    Settings(String),
}

impl IdentifyError {
    pub fn no_plugin(what: impl Into<String>) -> Self {
        Self::NoPlugin(what.into())
    }

    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}

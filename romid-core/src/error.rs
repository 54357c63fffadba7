use thiserror::Error;

/// Errors that can occur while parsing or repairing a ROM.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// I/O error while reading or writing the ROM
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The ROM format is not recognized or is invalid
    #[error("Invalid ROM format: {0}")]
    InvalidFormat(String),

    /// The ROM header is corrupted or incomplete
    #[error("Corrupted header: {0}")]
    CorruptedHeader(String),

    /// The ROM is too small to contain valid data
    #[error("ROM too small: expected at least {expected} bytes, got {actual}")]
    TooSmall { expected: u64, actual: u64 },

    /// Unsupported ROM variant or version
    #[error("Unsupported variant: {0}")]
    UnsupportedVariant(String),

    /// The file changed between staging and committing a header repair
    #[error("Repair conflict: {0}")]
    RepairConflict(String),

    /// Generic analysis error with message
    #[error("{0}")]
    Other(String),
}

impl AnalysisError {
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    pub fn corrupted_header(msg: impl Into<String>) -> Self {
        Self::CorruptedHeader(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedVariant(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// True for errors meaning "this file is not in the expected format".
    ///
    /// These are an expected outcome for real libraries and are turned into
    /// "not recognized" by the plugins. Everything else (I/O, failed repair
    /// writes) is surfaced to the caller.
    pub fn is_format_mismatch(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat(_)
                | Self::CorruptedHeader(_)
                | Self::TooSmall { .. }
                | Self::UnsupportedVariant(_)
        )
    }
}

/// Convert a parser result into the "recognized / not recognized" shape.
///
/// Format mismatches become `Ok(None)`; real failures are passed through.
pub fn recognized<T>(result: Result<T, AnalysisError>) -> Result<Option<T>, AnalysisError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_format_mismatch() => {
            log::debug!("not recognized: {e}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Map a short read to `TooSmall` so truncated files count as a format mismatch.
pub fn short_read(e: std::io::Error, expected: u64, actual: u64) -> AnalysisError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        AnalysisError::TooSmall { expected, actual }
    } else {
        AnalysisError::Io(e)
    }
}

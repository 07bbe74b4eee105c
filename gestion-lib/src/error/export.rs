//! Export error types

/// Errors during CSV export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The exported text was not valid UTF-8 (custom delimiters only).
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

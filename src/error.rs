//! Error types for the GMG subtractor and its replay tooling.

/// Result type alias
pub type Result<T> = std::result::Result<T, GmgError>;

#[derive(Debug, thiserror::Error)]
pub enum GmgError {
    /// A configuration value is out of its accepted range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A frame did not carry exactly one reading per grid pixel.
    #[error("Frame size mismatch: expected {expected} readings, got {actual}")]
    FrameSize { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A recorded frame line could not be parsed.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Config file error: {0}")]
    Json(#[from] serde_json::Error),
}

use std::path::PathBuf;
use thiserror::Error;

/// Error types for the image-describer crate.
///
/// Every operation returns one of these so the caller decides whether a
/// failure aborts the run or is only reported. Label detection is the one
/// step the pipeline downgrades to a logged, non-fatal outcome.
///
/// # Examples
///
/// ```
/// use image_describer::{DescriberError, Result};
///
/// fn require_key(value: Option<&str>) -> Result<&str> {
///     value
///         .filter(|v| !v.trim().is_empty())
///         .ok_or_else(|| DescriberError::Config("GOOGLE_API_KEY is not set".into()))
/// }
///
/// match require_key(None) {
///     Err(DescriberError::Config(msg)) => println!("Configuration problem: {}", msg),
///     other => println!("Unexpected: {:?}", other),
/// }
/// ```
#[derive(Error, Debug)]
pub enum DescriberError {
    /// Missing or unusable configuration (for example an absent API key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading a local file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the report to the console or another sink failed
    #[error("Output error: {0}")]
    Output(#[source] std::io::Error),

    /// Error interacting with a remote API
    #[error("API error: {0}")]
    ApiError(String),

    /// The annotation service reported an error inside an otherwise successful response
    #[error("Annotation error: {0}")]
    Annotation(String),

    /// Operation timed out
    #[error("Timeout error")]
    Timeout,

    /// HTTP client error (from reqwest)
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON parsing error (from serde_json)
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl DescriberError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DescriberError::Io {
            path: path.into(),
            source,
        }
    }
}

// HttpError, JsonError and Io wrap foreign errors without PartialEq,
// so two of them never compare equal.
impl PartialEq for DescriberError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Config(a), Self::Config(b)) => a == b,
            (Self::ApiError(a), Self::ApiError(b)) => a == b,
            (Self::Annotation(a), Self::Annotation(b)) => a == b,
            (Self::Timeout, Self::Timeout) => true,
            _ => false,
        }
    }
}

/// A specialized Result type for image-describer operations.
pub type Result<T> = std::result::Result<T, DescriberError>;

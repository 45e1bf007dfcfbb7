//! Error handling utilities shared across the crate.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result type used throughout the crate.
pub type Result<T, E = DbpeError> = std::result::Result<T, E>;

/// Domain-specific error describing failures during configuration, IO, download, or tokenizer operations.
#[derive(Debug, Error)]
pub enum DbpeError {
    /// Pipeline or trainer configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Filesystem IO error with optional context path.
    #[error("io error while processing {path:?}: {source}")]
    Io {
        /// Underlying IO error returned by the standard library.
        source: std::io::Error,
        /// Target path associated with the IO failure if available.
        path: Option<PathBuf>,
    },
    /// The raw corpus is absent locally and no download source is configured.
    #[error("raw corpus {path:?} not found and no corpus URL configured")]
    MissingInput {
        /// Expected location of the raw corpus file.
        path: PathBuf,
    },
    /// Network or HTTP failure while fetching the corpus.
    ///
    /// Any partially downloaded bytes remain on disk so a later run can resume.
    #[error("transport error while fetching {url}: {message}")]
    Transport {
        /// Source URL of the failed request.
        url: String,
        /// Human-readable description from the HTTP client.
        message: String,
    },
    /// Error bubbled up from the `tokenizers` crate.
    #[error("huggingface tokenizers error: {0}")]
    Tokenizers(String),
    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<tokenizers::Error> for DbpeError {
    fn from(err: tokenizers::Error) -> Self {
        Self::Tokenizers(err.to_string())
    }
}

impl From<serde_json::Error> for DbpeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl DbpeError {
    /// Helper constructor that attaches an optional path when wrapping IO errors.
    pub fn io(source: std::io::Error, path: Option<PathBuf>) -> Self {
        Self::Io { source, path }
    }

    /// Helper constructor for transport failures.
    pub fn transport(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.to_string(),
        }
    }
}

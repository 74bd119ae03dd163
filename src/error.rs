//! Error types for the competitor registry.

use std::path::PathBuf;
use thiserror::Error;

/// Everything a store, config or validation call can fail with.
#[derive(Error, Debug)]
pub enum Error {
    /// The backing CSV file does not exist.
    #[error("competitors file not found at {}", path.display())]
    NotFound { path: PathBuf },

    /// The backing file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The new line could not be appended (or the file created).
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The csv reader rejected the contents.
    #[error("failed to parse competitors file: {0}")]
    Parse(#[from] csv::Error),

    /// A required input field was missing or empty.
    #[error("{message}")]
    Validation { message: String },

    /// An environment variable held a value that could not be used.
    #[error("invalid configuration for {key}: {message}")]
    Config { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// True when the store file is simply absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

//! Error types and classification for decompress-migrate.
//!
//! This crate provides:
//! - [`MigrateError`] - Top-level error enum for run-level failures
//! - [`StoreError`] - Errors surfaced by object store backends
//! - [`TaskErrorKind`] - Per-object failure categories recorded in the report
//!
//! Run-level errors (listing failure, bad configuration) abort the run.
//! Task-level errors never propagate past the transfer worker; they are
//! converted into failure outcomes and aggregated.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for decompress-migrate.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Listing the source bucket failed. Fatal: no listing means nothing
    /// to migrate.
    #[error("Listing failed: {0}")]
    Listing(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors returned by object store backends.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The requested key does not exist
    #[error("Object not found: {0}")]
    NotFound(String),

    /// The caller is not allowed to access the bucket or key
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The store is throttling requests (SlowDown, TooManyRequests)
    #[error("Throttled: {0}")]
    Throttled(String),

    /// The destination rejected the write for quota reasons
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Transient transport failure (connection reset, 5xx, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Anything the backend could not classify further
    #[error("Store error: {0}")]
    Other(String),
}

impl StoreError {
    /// Whether a retry with backoff has a chance of succeeding.
    ///
    /// Throttling and transport failures are transient; missing keys,
    /// permission and quota problems are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Throttled(_) | Self::Network(_))
    }
}

/// Category of a failed transfer task, recorded in the migration report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskErrorKind {
    /// Fetching the source object failed
    Fetch,
    /// The object body was not valid gzip-framed data
    Decode,
    /// Writing to the destination bucket failed
    Write,
    /// An operation exceeded its time budget
    Timeout,
}

impl std::fmt::Display for TaskErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch => write!(f, "FetchError"),
            Self::Decode => write!(f, "DecodeError"),
            Self::Write => write!(f, "WriteError"),
            Self::Timeout => write!(f, "Timeout"),
        }
    }
}

/// Result type alias using MigrateError.
pub type Result<T> = std::result::Result<T, MigrateError>;

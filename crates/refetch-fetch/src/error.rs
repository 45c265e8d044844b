//! Error types for refetch-fetch.

use std::io;
use std::time::Duration;

use chrono::TimeDelta;
use http::{HeaderName, StatusCode};
use refetch_verify::VerificationError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Invalid [`FetchOptions`](crate::FetchOptions), reported before any I/O.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("destination path must be set")]
    MissingDestination,

    #[error("shelf life must not be negative, got {0}")]
    NegativeShelfLife(TimeDelta),

    #[error("hash digest must be set when hash algorithm {0:?} is set")]
    MissingDigest(String),

    #[error("hash algorithm must be set when hash digest is set")]
    MissingAlgorithm,

    #[error(transparent)]
    Hash(#[from] VerificationError),

    #[error("only one freshness strategy can be set, got {first} and {second}")]
    ConflictingFreshness {
        first:  &'static str,
        second: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid fetch options")]
    Config(#[from] ConfigError),

    #[error("document not found at {url}")]
    NotFound { url: String },

    #[error("bad HTTP code {} for {url}", .status.as_u16())]
    BadHttpCode { url: String, status: StatusCode },

    #[error("refusing to download {url}: {}", size_limit_reason(.limit, .declared))]
    SizeLimitExceeded {
        url:      String,
        limit:    u64,
        declared: Option<u64>,
    },

    #[error("hash mismatch for {url}: expected {expected}, got {actual}")]
    HashMismatch {
        url:      String,
        expected: String,
        actual:   String,
    },

    #[error("request to {url} failed")]
    Request {
        url:    String,
        #[source]
        source: BoxError,
    },

    #[error("failed reading response body from {url}")]
    Body {
        url:    String,
        #[source]
        source: BoxError,
    },

    #[error("failed to decode response body from {url} (stage {stage})")]
    Decode {
        url:    String,
        stage:  &'static str,
        #[source]
        source: io::Error,
    },

    #[error("invalid {name} header from {url}: {value:?}")]
    InvalidHeader {
        url:   String,
        name:  HeaderName,
        value: String,
    },

    #[error("fetching {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error(transparent)]
    Fs(#[from] refetch_fs::Error),
}

fn size_limit_reason(limit: &u64, declared: &Option<u64>) -> String {
    match declared {
        Some(declared) => format!("Content-Length={declared} exceeds the limit of {limit} bytes"),
        None => format!("limit of {limit} bytes exceeded while streaming"),
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;

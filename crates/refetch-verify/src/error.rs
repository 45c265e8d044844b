#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("hash mismatch: expected {expected}, got {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("unsupported hash algorithm {0:?}")]
    UnsupportedAlgorithm(String),

    #[error("invalid {algorithm} digest {digest:?}")]
    InvalidDigest {
        algorithm: &'static str,
        digest:    String,
    },
}

pub type Result<T> = std::result::Result<T, VerificationError>;

//! Content verification primitives for fetched artifacts.
//!
//! Computes digests incrementally as bytes stream through, so a download can be
//! written and verified in a single pass.
//!
//! # Example
//!
//! ```
//! use std::io::Read;
//! use refetch_verify::{HashAlgorithm, HashingReader, HexDigest};
//!
//! let expected = HexDigest::parse(
//!     HashAlgorithm::Sha256,
//!     "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9",
//! )
//! .unwrap();
//!
//! let mut reader = HashingReader::new(&b"hello world"[..], HashAlgorithm::Sha256.hasher());
//! let mut buffer = Vec::new();
//! reader.read_to_end(&mut buffer).unwrap();
//!
//! reader.finish(&expected).unwrap();
//! ```

pub use self::error::{Result, VerificationError};
pub use self::hasher::{
    AlgorithmHasher, DigestHasher, HashAlgorithm, Hasher, HexDigest, Md5Hasher, Sha256Hasher,
};
pub use self::reader::{HashingReader, file_digest};

mod error;
mod hasher;
mod reader;

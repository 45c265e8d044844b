use std::fmt;
use std::str::FromStr;

use digest::Digest;

use crate::{Result, VerificationError};

/// Incremental hash accumulator.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);
    fn finalize(self) -> Vec<u8>;
}

/// Adapts any RustCrypto [`Digest`] to [`Hasher`].
pub struct DigestHasher<D: Digest + Send>(D);

impl<D: Digest + Send> DigestHasher<D> {
    pub fn new() -> Self { Self(D::new()) }
}

impl<D: Digest + Send> Default for DigestHasher<D> {
    fn default() -> Self { Self::new() }
}

impl<D: Digest + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) { Digest::update(&mut self.0, data); }
    fn finalize(self) -> Vec<u8> { self.0.finalize().to_vec() }
}

pub type Sha256Hasher = DigestHasher<sha2::Sha256>;
pub type Md5Hasher = DigestHasher<md5::Md5>;

/// Hash algorithms accepted for download verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Sha256,
    Md5,
}

impl HashAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Md5 => "md5",
        }
    }

    /// Length of the raw digest in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Md5 => 16,
        }
    }

    pub fn hasher(self) -> AlgorithmHasher {
        match self {
            HashAlgorithm::Sha256 => AlgorithmHasher::Sha256(Sha256Hasher::new()),
            HashAlgorithm::Md5 => AlgorithmHasher::Md5(Md5Hasher::new()),
        }
    }

    pub fn digest(self, data: &[u8]) -> HexDigest {
        let mut hasher = self.hasher();
        hasher.update(data);
        HexDigest::from_bytes(&hasher.finalize())
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for HashAlgorithm {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "md5" => Ok(HashAlgorithm::Md5),
            _ => Err(VerificationError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

/// Hasher for an algorithm chosen at runtime.
pub enum AlgorithmHasher {
    Sha256(Sha256Hasher),
    Md5(Md5Hasher),
}

impl Hasher for AlgorithmHasher {
    fn update(&mut self, data: &[u8]) {
        match self {
            AlgorithmHasher::Sha256(h) => h.update(data),
            AlgorithmHasher::Md5(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            AlgorithmHasher::Sha256(h) => h.finalize(),
            AlgorithmHasher::Md5(h) => h.finalize(),
        }
    }
}

/// Lowercase hexadecimal digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexDigest(String);

impl HexDigest {
    /// Parses `s` as a digest of `algorithm`, checking its length and alphabet.
    pub fn parse(algorithm: HashAlgorithm, s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != algorithm.digest_len() * 2 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(VerificationError::InvalidDigest {
                algorithm: algorithm.as_str(),
                digest:    s.to_string(),
            });
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Self { Self(hex::encode(bytes)) }

    pub fn as_str(&self) -> &str { &self.0 }

    pub fn into_string(self) -> String { self.0 }

    /// Fails with [`VerificationError::Mismatch`] unless `self` equals `expected`.
    pub fn verify(&self, expected: &HexDigest) -> Result<()> {
        if self == expected {
            Ok(())
        } else {
            Err(VerificationError::Mismatch {
                expected: expected.0.clone(),
                actual:   self.0.clone(),
            })
        }
    }
}

impl fmt::Display for HexDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

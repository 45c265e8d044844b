use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::TimeDelta;
use refetch_fs::FileMode;
use refetch_verify::{HashAlgorithm, HexDigest};
use tracing::Span;

use super::freshness::Freshness;
use super::options::FetchOptions;
use crate::error::ConfigError;

/// Expected digest of the decoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashSpec {
    pub algorithm: HashAlgorithm,
    pub digest:    HexDigest,
}

/// Validated, immutable input of a single fetch.
#[derive(Debug, Clone)]
pub struct FetchSpec {
    pub(crate) destination:     PathBuf,
    pub(crate) make_dirs:       bool,
    pub(crate) span:            Option<Span>,
    pub(crate) freshness:       Freshness,
    pub(crate) shelf_life:      TimeDelta,
    pub(crate) mode:            Option<FileMode>,
    pub(crate) max_size:        Option<u64>,
    pub(crate) hash:            Option<HashSpec>,
    pub(crate) compare_content: bool,
    pub(crate) etag_file:       Option<PathBuf>,
    pub(crate) timeout:         Option<Duration>,
}

impl FetchSpec {
    pub fn destination(&self) -> &Path { &self.destination }

    pub fn freshness(&self) -> &Freshness { &self.freshness }

    pub fn hash(&self) -> Option<&HashSpec> { self.hash.as_ref() }

    pub fn max_size(&self) -> Option<u64> { self.max_size }
}

impl FetchOptions {
    /// Checks the options and freezes them into a [`FetchSpec`].
    ///
    /// Fails when the destination is unset, the shelf life is negative, only
    /// one half of the hash is given, the hash is unusable, or more than one
    /// freshness strategy was configured.
    pub fn validate(&self) -> Result<FetchSpec, ConfigError> {
        let destination = match &self.destination {
            Some(path) if !path.as_os_str().is_empty() => path.clone(),
            _ => return Err(ConfigError::MissingDestination),
        };

        if self.shelf_life < TimeDelta::zero() {
            return Err(ConfigError::NegativeShelfLife(self.shelf_life));
        }

        let hash = match (self.hash_algorithm.is_empty(), self.hash_digest.is_empty()) {
            (true, true) => None,
            (false, true) => return Err(ConfigError::MissingDigest(self.hash_algorithm.clone())),
            (true, false) => return Err(ConfigError::MissingAlgorithm),
            (false, false) => {
                let algorithm: HashAlgorithm = self.hash_algorithm.parse()?;
                let digest = HexDigest::parse(algorithm, &self.hash_digest)?;
                Some(HashSpec { algorithm, digest })
            }
        };

        if let Some((first, second)) = self.conflict {
            return Err(ConfigError::ConflictingFreshness { first, second });
        }

        Ok(FetchSpec {
            destination,
            make_dirs: self.make_dirs,
            span: self.span.clone(),
            freshness: self.freshness.clone(),
            shelf_life: self.shelf_life,
            mode: self.mode,
            max_size: self.max_size,
            hash,
            compare_content: self.compare_content,
            etag_file: self.etag_file.clone(),
            timeout: self.timeout,
        })
    }
}

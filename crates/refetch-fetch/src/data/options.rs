use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use refetch_fs::FileMode;
use tracing::Span;

use super::freshness::{EtagFile, EtagProvider, Freshness, StaticEtag};

/// Configuration for a conditional fetch.
///
/// Every setter is independent and has no side effect; the combination is
/// checked by [`FetchOptions::validate`], which runs before each fetch.
///
/// # Examples
///
/// ```
/// use chrono::TimeDelta;
/// use refetch_fetch::FetchOptions;
///
/// let options = FetchOptions::new()
///     .destination("/var/lib/app/data.json")
///     .make_dirs(true)
///     .head_last_modified()
///     .shelf_life(TimeDelta::days(7))
///     .max_size(10 * 1024 * 1024)
///     .compare_content(true);
///
/// assert!(options.validate().is_ok());
/// ```
#[derive(Clone, Default)]
pub struct FetchOptions {
    pub(crate) destination:     Option<PathBuf>,
    pub(crate) make_dirs:       bool,
    pub(crate) span:            Option<Span>,
    pub(crate) freshness:       Freshness,
    pub(crate) conflict:        Option<(&'static str, &'static str)>,
    pub(crate) shelf_life:      TimeDelta,
    pub(crate) mode:            Option<FileMode>,
    pub(crate) max_size:        Option<u64>,
    pub(crate) hash_algorithm:  String,
    pub(crate) hash_digest:     String,
    pub(crate) compare_content: bool,
    pub(crate) etag_file:       Option<PathBuf>,
    pub(crate) timeout:         Option<Duration>,
}

impl FetchOptions {
    pub fn new() -> Self { Self::default() }

    /// Path of the file to materialize. Its mtime and mode, when it exists,
    /// feed the freshness checks and the mode of the replacement.
    pub fn destination(mut self, path: impl Into<PathBuf>) -> Self {
        self.destination = Some(path.into());
        self
    }

    /// Create missing parent directories of the destination.
    pub fn make_dirs(mut self, make_dirs: bool) -> Self {
        self.make_dirs = make_dirs;
        self
    }

    /// Span under which every event of a fetch is recorded.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn freshness(mut self, freshness: Freshness) -> Self {
        if freshness.is_none() {
            self.freshness = Freshness::None;
            self.conflict = None;
            self.etag_file = None;
            return self;
        }

        if !self.freshness.is_none() && self.freshness.name() != freshness.name() {
            self.conflict.get_or_insert((self.freshness.name(), freshness.name()));
        }
        self.freshness = freshness;
        self
    }

    /// Skip the download when a HEAD request reports a `Last-Modified` that is
    /// not newer than the local file.
    pub fn head_last_modified(self) -> Self { self.freshness(Freshness::HeadLastModified) }

    /// Send `If-Modified-Since` with the local mtime; a 304 skips the download.
    pub fn if_modified_since(self) -> Self { self.freshness(Freshness::IfModifiedSince) }

    /// Send a fixed `If-None-Match` token.
    pub fn etag(self, etag: impl Into<String>) -> Self {
        self.etag_provider(StaticEtag(etag.into()))
    }

    /// Compute the `If-None-Match` token from the destination path.
    pub fn etag_fn<F>(self, f: F) -> Self
    where
        F: Fn(&std::path::Path) -> std::io::Result<String> + Send + Sync + 'static,
    {
        self.etag_provider(f)
    }

    pub fn etag_provider(self, provider: impl EtagProvider + 'static) -> Self {
        self.freshness(Freshness::ETag(Arc::new(provider)))
    }

    /// Read the `If-None-Match` token from a sidecar file and store the
    /// response's `ETag` there after a successful download.
    pub fn etag_file(self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut options = self.etag_provider(EtagFile::new(path.clone()));
        options.etag_file = Some(path);
        options
    }

    /// Age after which a local file is stale when the server gives no
    /// `Last-Modified`. Zero means always stale.
    pub fn shelf_life(mut self, shelf_life: TimeDelta) -> Self {
        self.shelf_life = shelf_life;
        self
    }

    /// Mode of the downloaded file. Defaults to the mode of the file it replaces.
    /// Zero leaves the mode unset.
    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = (mode != 0).then(|| FileMode::from_unix_mode(mode));
        self
    }

    /// Upper bound on the decoded size of the body.
    pub fn max_size(mut self, bytes: u64) -> Self {
        self.max_size = Some(bytes);
        self
    }

    /// Verify the decoded body against a hex digest. Empty strings unset either part.
    pub fn verify_hash(mut self, algorithm: impl Into<String>, digest: impl Into<String>) -> Self {
        self.hash_algorithm = algorithm.into();
        self.hash_digest = digest.into();
        self
    }

    /// After downloading, keep the existing file when its bytes are identical.
    pub fn compare_content(mut self, compare_content: bool) -> Self {
        self.compare_content = compare_content;
        self
    }

    /// Bound on the whole fetch: HEAD, GET and body copy.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOptions")
            .field("destination", &self.destination)
            .field("make_dirs", &self.make_dirs)
            .field("freshness", &self.freshness)
            .field("shelf_life", &self.shelf_life)
            .field("mode", &self.mode)
            .field("max_size", &self.max_size)
            .field("hash_algorithm", &self.hash_algorithm)
            .field("hash_digest", &self.hash_digest)
            .field("compare_content", &self.compare_content)
            .field("etag_file", &self.etag_file)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

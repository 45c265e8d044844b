use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use refetch_verify::{HashAlgorithm, file_digest};

/// How a fetch decides whether the local copy is already current.
///
/// At most one strategy is active per fetch.
#[derive(Clone, Default)]
pub enum Freshness {
    /// Always issue the GET.
    #[default]
    None,

    /// Probe with HEAD and compare `Last-Modified` to the local mtime, falling
    /// back to the shelf life when the header is absent.
    HeadLastModified,

    /// Send the local mtime as `If-Modified-Since` and let the server answer 304.
    IfModifiedSince,

    /// Send a token from the provider as `If-None-Match`.
    ETag(Arc<dyn EtagProvider>),
}

impl Freshness {
    pub fn name(&self) -> &'static str {
        match self {
            Freshness::None => "none",
            Freshness::HeadLastModified => "head-last-modified",
            Freshness::IfModifiedSince => "if-modified-since",
            Freshness::ETag(_) => "etag",
        }
    }

    pub fn is_none(&self) -> bool { matches!(self, Freshness::None) }
}

impl fmt::Debug for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// Source of the opaque token sent as `If-None-Match`.
///
/// Only consulted when the destination already exists. An empty token means
/// "no validator"; an error is logged and the request goes out unconditioned.
pub trait EtagProvider: Send + Sync {
    fn etag(&self, destination: &Path) -> io::Result<String>;
}

impl<F> EtagProvider for F
where
    F: Fn(&Path) -> io::Result<String> + Send + Sync,
{
    fn etag(&self, destination: &Path) -> io::Result<String> { self(destination) }
}

/// A caller-held token.
#[derive(Debug, Clone)]
pub struct StaticEtag(pub String);

impl EtagProvider for StaticEtag {
    fn etag(&self, _destination: &Path) -> io::Result<String> { Ok(self.0.clone()) }
}

/// A sidecar file holding the `ETag` of the last successful fetch.
///
/// The sidecar is ignored unless it is at least as recent as the destination:
/// an older one describes content that has since been replaced.
#[derive(Debug, Clone)]
pub struct EtagFile {
    path: PathBuf,
}

impl EtagFile {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    pub fn path(&self) -> &Path { &self.path }
}

impl EtagProvider for EtagFile {
    fn etag(&self, destination: &Path) -> io::Result<String> {
        if !is_at_least_as_recent(&self.path, destination) {
            return Ok(String::new());
        }

        match fs::read_to_string(&self.path) {
            Ok(etag) => Ok(etag.trim().to_string()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(io::Error::new(
                e.kind(),
                format!("can't read etag file {}: {e}", self.path.display()),
            )),
        }
    }
}

/// Uses the hex digest of the existing destination as the token, for servers
/// whose ETags are content hashes.
#[derive(Debug, Clone, Copy)]
pub struct FileDigest(pub HashAlgorithm);

impl Default for FileDigest {
    fn default() -> Self { Self(HashAlgorithm::Sha256) }
}

impl EtagProvider for FileDigest {
    fn etag(&self, destination: &Path) -> io::Result<String> {
        Ok(file_digest(destination, self.0)?
            .map(|digest| digest.into_string())
            .unwrap_or_default())
    }
}

// False when either file is missing.
fn is_at_least_as_recent(path: &Path, other: &Path) -> bool {
    let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified());
    match (modified(path), modified(other)) {
        (Ok(a), Ok(b)) => a >= b,
        _ => false,
    }
}

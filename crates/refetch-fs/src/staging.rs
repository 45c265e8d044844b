use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::{Error, FileMode, Result};

const STAGING_SUFFIX: &str = ".download";

/// A uniquely named file next to a destination, removed on drop unless promoted.
///
/// Living in the destination's directory keeps [`StagingFile::promote`] a plain
/// rename on the same filesystem.
#[derive(Debug)]
pub struct StagingFile {
    path: TempPath,
}

impl StagingFile {
    /// Creates `<name>.<random>.download` in the directory of `destination`.
    pub fn beside(destination: impl AsRef<Path>) -> Result<(File, Self)> {
        let destination = destination.as_ref();
        let name = destination.file_name().ok_or_else(|| Error::InvalidDestination {
            path: destination.to_path_buf(),
        })?;
        let dir = parent_dir(destination);

        let mut prefix = OsString::from(name);
        prefix.push(".");

        let (file, path) = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(STAGING_SUFFIX)
            .rand_bytes(8)
            .tempfile_in(dir)
            .map_err(|source| Error::Stage {
                dir: dir.to_path_buf(),
                source,
            })?
            .into_parts();

        Ok((file, Self { path }))
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn set_mode(&self, mode: FileMode) -> Result<()> { mode.apply_to_path(&self.path) }

    /// Atomically moves the staging file over `destination`.
    ///
    /// The rename replaces an existing destination on every platform, so the
    /// destination is never observed half written.
    pub fn promote(self, destination: impl AsRef<Path>) -> Result<()> {
        let destination = destination.as_ref();
        self.path.persist(destination).map_err(|e| Error::Replace {
            path:   destination.to_path_buf(),
            source: e.error,
        })
    }

    /// Removes the staging file now instead of on drop.
    pub fn discard(self) -> Result<()> {
        let path = self.path.to_path_buf();
        self.path.close().map_err(|source| Error::Write { path, source })
    }
}

fn parent_dir(destination: &Path) -> &Path {
    match destination.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Creates the parent directories of `destination`.
pub fn create_parent_dirs(destination: impl AsRef<Path>) -> Result<PathBuf> {
    let destination = destination.as_ref();
    let dir = parent_dir(destination);

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }

    builder.create(dir).map_err(|source| Error::CreateDir {
        path: destination.to_path_buf(),
        source,
    })?;

    Ok(dir.to_path_buf())
}

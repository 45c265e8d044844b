use std::fs::{self, Metadata};
use std::io;
use std::path::Path;
use std::time::SystemTime;

use crate::{Error, FileMode, Result};

/// What is known about a destination file before it is replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DestinationState {
    pub modified: SystemTime,
    pub mode:     FileMode,
}

impl DestinationState {
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Result<Self> {
        let modified = metadata.modified().map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            modified,
            mode: FileMode::of(metadata),
        })
    }

    /// Reads the state of `path`; `Ok(None)` when it does not exist.
    pub fn read(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        match fs::metadata(path) {
            Ok(metadata) => Self::from_metadata(path, &metadata).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

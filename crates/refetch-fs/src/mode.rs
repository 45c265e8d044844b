use std::fs::{self, Metadata};
use std::path::Path;

use crate::{Error, Result};

/// Permission bits for a fetched file, expressed as a Unix mode.
///
/// On Unix the bits are applied verbatim. On Windows only the owner write bit is
/// meaningful: without it the file gets the `readonly` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FileMode(u32);

impl FileMode {
    pub fn from_unix_mode(mode: u32) -> Self { Self(mode & 0o7777) }

    pub fn to_unix_mode(self) -> u32 { self.0 }

    pub fn is_readonly(self) -> bool { self.0 & 0o200 == 0 }

    #[cfg(unix)]
    pub fn of(metadata: &Metadata) -> Self {
        use std::os::unix::fs::PermissionsExt;
        Self(metadata.permissions().mode() & 0o777)
    }

    #[cfg(not(unix))]
    pub fn of(metadata: &Metadata) -> Self {
        if metadata.permissions().readonly() {
            Self(0o444)
        } else {
            Self(0o644)
        }
    }

    #[cfg(unix)]
    fn to_permissions(self, _current: fs::Permissions) -> fs::Permissions {
        use std::os::unix::fs::PermissionsExt;
        fs::Permissions::from_mode(self.0)
    }

    #[cfg(not(unix))]
    fn to_permissions(self, mut current: fs::Permissions) -> fs::Permissions {
        current.set_readonly(self.is_readonly());
        current
    }

    pub fn apply_to_path(self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let to_error = |source| Error::Permissions {
            path: path.to_path_buf(),
            source,
        };

        let current = fs::metadata(path).map_err(to_error)?.permissions();
        fs::set_permissions(path, self.to_permissions(current)).map_err(to_error)
    }
}

impl std::fmt::Display for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{:04o}", self.0) }
}

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("destination {path:?} has no file name")]
    InvalidDestination { path: PathBuf },

    #[error("failed to read {path:?}")]
    Read {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path:?}")]
    Write {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create directories for {path:?}")]
    CreateDir {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create temporary download file in {dir:?}")]
    Stage {
        dir:    PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to set permissions on {path:?}")]
    Permissions {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to replace {path:?}")]
    Replace {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to update modification time of {path:?}")]
    Touch {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

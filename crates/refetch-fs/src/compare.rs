use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use filetime::FileTime;

use crate::{Error, Result};

const BUF_SIZE: usize = 8 * 1024;

/// Returns true if both files exist and hold the same bytes.
///
/// A missing file on either side compares as different.
pub fn same_content(a: impl AsRef<Path>, b: impl AsRef<Path>) -> Result<bool> {
    let (a, b) = (a.as_ref(), b.as_ref());

    let Some(mut file_a) = open_existing(a)? else { return Ok(false) };
    let Some(mut file_b) = open_existing(b)? else { return Ok(false) };

    let len_a = file_a.metadata().map_err(|source| read_error(a, source))?.len();
    let len_b = file_b.metadata().map_err(|source| read_error(b, source))?.len();
    if len_a != len_b {
        return Ok(false);
    }

    let mut buf_a = vec![0u8; BUF_SIZE];
    let mut buf_b = vec![0u8; BUF_SIZE];

    loop {
        let n_a = read_full(&mut file_a, &mut buf_a).map_err(|source| read_error(a, source))?;
        let n_b = read_full(&mut file_b, &mut buf_b).map_err(|source| read_error(b, source))?;

        if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
    }
}

/// Sets the access and modification times of `path` to now.
pub fn touch(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let now = FileTime::now();
    filetime::set_file_times(path, now, now).map_err(|source| Error::Touch {
        path: path.to_path_buf(),
        source,
    })
}

fn open_existing(path: &Path) -> Result<Option<File>> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(read_error(path, source)),
    }
}

// Fills `buf` unless EOF comes first.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn read_error(path: &Path, source: io::Error) -> Error {
    Error::Read {
        path: path.to_path_buf(),
        source,
    }
}

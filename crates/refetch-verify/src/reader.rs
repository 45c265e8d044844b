use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::{HashAlgorithm, Hasher, HexDigest, Result};

/// Streaming reader that hashes data as it passes through.
pub struct HashingReader<R, H> {
    reader: R,
    hasher: H,
}

impl<R, H> HashingReader<R, H> {
    pub fn new(reader: R, hasher: H) -> Self { Self { reader, hasher } }
}

impl<R: Read, H: Hasher> Read for HashingReader<R, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

impl<R, H: Hasher> HashingReader<R, H> {
    pub fn into_digest(self) -> HexDigest { HexDigest::from_bytes(&self.hasher.finalize()) }

    /// Finalize against an expected digest.
    pub fn finish(self, expected: &HexDigest) -> Result<()> { self.into_digest().verify(expected) }
}

/// Hex digest of the file at `path`, or `None` when it does not exist.
pub fn file_digest(path: impl AsRef<Path>, algorithm: HashAlgorithm) -> io::Result<Option<HexDigest>> {
    let file = match File::open(path.as_ref()) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut reader = HashingReader::new(file, algorithm.hasher());
    io::copy(&mut reader, &mut io::sink())?;
    Ok(Some(reader.into_digest()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Sha256Hasher, VerificationError};
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn test_hashing_reader_success() {
        let data = b"test data for verification";
        let expected = HashAlgorithm::Sha256.digest(data);

        let mut reader = HashingReader::new(Cursor::new(data), Sha256Hasher::new());
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer).unwrap();

        assert_eq!(buffer, data);
        reader.finish(&expected).unwrap();
    }

    #[test]
    fn test_hashing_reader_mismatch() {
        let mut reader = HashingReader::new(Cursor::new(b"test data"), Sha256Hasher::new());
        io::copy(&mut reader, &mut io::sink()).unwrap();

        let wrong = HexDigest::from_bytes(&[0; 32]);
        match reader.finish(&wrong) {
            Err(VerificationError::Mismatch { expected, actual }) => {
                assert_eq!(expected, wrong.as_str());
                assert_ne!(actual, wrong.as_str());
            }
            other => panic!("expected Mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_file_digest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"hello world").unwrap();

        let digest = file_digest(&path, HashAlgorithm::Sha256).unwrap().unwrap();
        assert_eq!(digest, HashAlgorithm::Sha256.digest(b"hello world"));
    }

    #[test]
    fn test_file_digest_missing_file() {
        let dir = tempdir().unwrap();
        assert!(file_digest(dir.path().join("absent"), HashAlgorithm::Md5).unwrap().is_none());
    }
}

//! Streams an accepted response into a staging file and moves it into place.

use std::path::Path;

use bytes::Bytes;
use futures_util::StreamExt;
use http::HeaderMap;
use http::header::{CONTENT_ENCODING, ETAG};
use refetch_fs::{DestinationState, StagingFile, create_parent_dirs, same_content, touch};
use refetch_verify::VerificationError;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, warn};

use super::client::HttpResponse;
use crate::data::FetchSpec;
use crate::error::{FetchError, Result};
use crate::transform::{Pipeline, StageError, StageErrorKind};

/// Writes the body of `response` to the destination of `spec`.
///
/// Returns whether the destination now holds different content. On any error
/// the destination is left untouched and the staging file is removed.
pub async fn commit<E>(
    spec: &FetchSpec,
    url: &str,
    response: HttpResponse<E>,
    previous: Option<&DestinationState>,
) -> Result<bool>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let destination = spec.destination.as_path();

    if spec.make_dirs {
        let dir = create_parent_dirs(destination)?;
        debug!(dir = %dir.display(), "ensured parent directories");
    }

    let (file, staging) = StagingFile::beside(destination)?;
    debug!(staging = %staging.path().display(), "staging download");

    let gzip = is_gzip(&response.headers);
    let mut pipeline = Pipeline::for_spec(spec, gzip);
    let mut body = response.body;
    let mut file = tokio::fs::File::from_std(file);
    let mut written = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| FetchError::Body {
            url:    url.to_string(),
            source: Box::new(e),
        })?;
        let out = pipeline.process(chunk).map_err(|e| stage_error(url, e))?;
        written += write_chunk(&mut file, staging.path(), out).await?;
    }
    let tail = pipeline.finish().map_err(|e| stage_error(url, e))?;
    written += write_chunk(&mut file, staging.path(), tail).await?;

    debug!(bytes = written, gzip, "body received");

    let report = pipeline.into_report();
    if let (Some(hash), Some(actual)) = (&spec.hash, &report.digest) {
        if let Err(VerificationError::Mismatch { expected, actual }) = actual.verify(&hash.digest) {
            return Err(FetchError::HashMismatch {
                url: url.to_string(),
                expected,
                actual,
            });
        }
        debug!(algorithm = %hash.algorithm, "digest verified");
    }

    let write_error = |source| refetch_fs::Error::Write {
        path: staging.path().to_path_buf(),
        source,
    };
    file.flush().await.map_err(write_error)?;
    file.sync_all().await.map_err(write_error)?;
    drop(file);

    if let Some(mode) = spec.mode.or(previous.map(|state| state.mode)) {
        staging.set_mode(mode)?;
    }

    if spec.compare_content && previous.is_some() && is_unchanged(staging.path(), destination).await {
        debug!("content unchanged, keeping existing file");
        staging.discard()?;
        touch(destination)?;
        if let Some(sidecar) = &spec.etag_file {
            store_etag(sidecar, &response.headers).await;
        }
        return Ok(false);
    }

    staging.promote(destination)?;
    debug!(destination = %destination.display(), "destination replaced");

    // Written last so the sidecar is never older than the destination.
    if let Some(sidecar) = &spec.etag_file {
        store_etag(sidecar, &response.headers).await;
    }
    Ok(true)
}

/// Whether `staging` holds the same bytes as `destination`. A failed
/// comparison counts as changed.
async fn is_unchanged(staging: &Path, destination: &Path) -> bool {
    let (a, b) = (staging.to_path_buf(), destination.to_path_buf());
    let same = tokio::task::spawn_blocking(move || same_content(a, b))
        .await
        .unwrap_or_else(|e| {
            Err(refetch_fs::Error::Read {
                path:   destination.to_path_buf(),
                source: std::io::Error::other(e),
            })
        });

    same.unwrap_or_else(|e| {
        warn!(error = %e, "content comparison failed, replacing file");
        false
    })
}

async fn write_chunk(file: &mut tokio::fs::File, path: &Path, chunk: Bytes) -> Result<u64> {
    if chunk.is_empty() {
        return Ok(0);
    }
    file.write_all(&chunk).await.map_err(|source| refetch_fs::Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(chunk.len() as u64)
}

fn is_gzip(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("gzip"))
}

fn stage_error(url: &str, e: StageError) -> FetchError {
    match e.kind {
        StageErrorKind::Decode(source) => FetchError::Decode {
            url: url.to_string(),
            stage: e.stage,
            source,
        },
        StageErrorKind::LimitExceeded { limit } => FetchError::SizeLimitExceeded {
            url: url.to_string(),
            limit,
            declared: None,
        },
    }
}

// Best effort: a failure here never fails the fetch.
async fn store_etag(sidecar: &Path, headers: &HeaderMap) {
    let Some(etag) = headers.get(ETAG).and_then(|value| value.to_str().ok()) else {
        warn!(sidecar = %sidecar.display(), "no ETag in response, not updating etag file");
        return;
    };

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let result = async {
        let mut file = options.open(sidecar).await?;
        file.write_all(etag.as_bytes()).await?;
        file.flush().await
    }
    .await;

    match result {
        Ok(()) => debug!(sidecar = %sidecar.display(), etag, "stored etag"),
        Err(e) => error!(sidecar = %sidecar.display(), error = %e, "can't write etag file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_identical_files_are_unchanged() {
        let dir = tempdir().unwrap();
        let (a, b) = (dir.path().join("a"), dir.path().join("b"));
        fs::write(&a, "same").unwrap();
        fs::write(&b, "same").unwrap();

        assert!(is_unchanged(&a, &b).await);
        fs::write(&b, "other").unwrap();
        assert!(!is_unchanged(&a, &b).await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_unreadable_destination_counts_as_changed() {
        // A directory opens fine but fails on read; sizing the file to match
        // forces the comparison past the length check.
        let dir = tempdir().unwrap();
        let destination = dir.path().join("dest");
        fs::create_dir(&destination).unwrap();
        let len = fs::metadata(&destination).unwrap().len() as usize;
        let staging = dir.path().join("staging");
        fs::write(&staging, vec![b'x'; len]).unwrap();

        assert!(same_content(&staging, &destination).is_err());
        assert!(!is_unchanged(&staging, &destination).await);
    }

    #[test]
    fn test_is_gzip() {
        let mut headers = HeaderMap::new();
        assert!(!is_gzip(&headers));
        headers.insert(CONTENT_ENCODING, http::HeaderValue::from_static(" GZIP "));
        assert!(is_gzip(&headers));
        headers.insert(CONTENT_ENCODING, http::HeaderValue::from_static("br"));
        assert!(!is_gzip(&headers));
    }
}

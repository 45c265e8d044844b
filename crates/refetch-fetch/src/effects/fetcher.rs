use http::header::{ACCEPT_ENCODING, CONTENT_LENGTH};
use http::{HeaderValue, StatusCode};
use refetch_fs::DestinationState;
use tracing::{Instrument, debug, debug_span, error, warn};

use super::client::{HttpClient, HttpRequest};
use super::commit::commit;
use super::decide::{Decision, decide};
use crate::data::{FetchOptions, FetchSpec};
use crate::error::{FetchError, Result};

/// Downloads a URL to a file when, and only when, the remote copy differs.
///
/// The options are validated on every call, and the destination is re-read
/// each time, so one fetcher can be reused for periodic refreshes.
pub struct Fetcher<C: HttpClient> {
    client:  C,
    options: FetchOptions,
}

impl<C: HttpClient> Fetcher<C> {
    pub fn new(client: C, options: FetchOptions) -> Self { Self { client, options } }

    pub fn client(&self) -> &C { &self.client }

    pub fn options(&self) -> &FetchOptions { &self.options }

    /// Fetches `url` into the configured destination.
    ///
    /// Returns `Ok(true)` when the destination was replaced and `Ok(false)`
    /// when it was already current, either because a freshness check said so
    /// or because the downloaded bytes were identical.
    pub async fn fetch(&self, url: &str) -> Result<bool> {
        let spec = self.options.validate()?;

        let span = spec.span.clone().unwrap_or_else(|| {
            debug_span!("fetch", url, destination = %spec.destination.display())
        });

        let run = self.run(&spec, url).instrument(span);
        match spec.timeout {
            Some(after) => tokio::time::timeout(after, run)
                .await
                .map_err(|_| FetchError::Timeout { url: url.to_string(), after })?,
            None => run.await,
        }
    }

    async fn run(&self, spec: &FetchSpec, url: &str) -> Result<bool> {
        let state = read_state(spec);

        let conditional = match decide(&self.client, spec, url, state.as_ref()).await {
            Decision::Current => {
                debug!("destination is current, skipping download");
                return Ok(false);
            }
            Decision::Fetch(headers) => headers,
        };

        let mut request = HttpRequest::get(url, conditional);
        request.headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        let response = self.client.send(request).await.map_err(|e| FetchError::Request {
            url:    url.to_string(),
            source: Box::new(e),
        })?;

        match response.status {
            StatusCode::OK => {}
            StatusCode::NOT_MODIFIED => {
                debug!("not modified");
                return Ok(false);
            }
            StatusCode::NOT_FOUND => return Err(FetchError::NotFound { url: url.to_string() }),
            status => {
                return Err(FetchError::BadHttpCode {
                    url: url.to_string(),
                    status,
                });
            }
        }

        if let Some(limit) = spec.max_size {
            check_declared_length(url, limit, &response.headers)?;
        }

        commit(spec, url, response, state.as_ref()).await
    }
}

fn read_state(spec: &FetchSpec) -> Option<DestinationState> {
    DestinationState::read(&spec.destination).unwrap_or_else(|e| {
        error!(error = %e, "can't read destination state, treating as absent");
        None
    })
}

fn check_declared_length(url: &str, limit: u64, headers: &http::HeaderMap) -> Result<()> {
    let Some(value) = headers.get(CONTENT_LENGTH) else { return Ok(()) };

    match value.to_str().ok().and_then(|v| v.trim().parse::<u64>().ok()) {
        Some(declared) if declared > limit => Err(FetchError::SizeLimitExceeded {
            url: url.to_string(),
            limit,
            declared: Some(declared),
        }),
        Some(_) => Ok(()),
        None => {
            warn!(value = ?value, "unparseable Content-Length, ignoring");
            Ok(())
        }
    }
}

//! Decides whether the GET is needed and which conditional headers it carries.

use std::time::SystemTime;

use http::header::{IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use http::{HeaderMap, HeaderValue, StatusCode};
use tracing::{debug, warn};

use super::client::{HttpClient, HttpRequest};
use crate::core::{format_http_date, is_local_old, parse_http_date, remote_is_newer};
use crate::data::{FetchSpec, Freshness};
use crate::error::{FetchError, Result};
use refetch_fs::DestinationState;

#[derive(Debug)]
pub enum Decision {
    /// The local copy is current; no GET is issued.
    Current,
    /// Issue the GET with these extra headers.
    Fetch(HeaderMap),
}

pub async fn decide<C: HttpClient>(
    client: &C,
    spec: &FetchSpec,
    url: &str,
    state: Option<&DestinationState>,
) -> Decision {
    let Some(state) = state else {
        return Decision::Fetch(HeaderMap::new());
    };

    let mut headers = HeaderMap::new();
    match &spec.freshness {
        Freshness::None => {}
        Freshness::HeadLastModified => match check_last_modified(client, spec, url, state).await {
            Ok(true) => return Decision::Current,
            Ok(false) => {}
            Err(e) => warn!(error = %e, "HEAD check failed, downloading anyway"),
        },
        Freshness::IfModifiedSince => {
            let since = format_http_date(state.modified);
            match HeaderValue::from_str(&since) {
                Ok(value) => {
                    debug!(since = %since, "sending If-Modified-Since");
                    headers.insert(IF_MODIFIED_SINCE, value);
                }
                Err(e) => warn!(error = %e, "can't encode If-Modified-Since"),
            }
        }
        Freshness::ETag(provider) => match provider.etag(&spec.destination) {
            Ok(etag) if etag.is_empty() => debug!("no etag for existing destination"),
            Ok(etag) => match HeaderValue::from_str(&etag) {
                Ok(value) => {
                    debug!(etag = %etag, "sending If-None-Match");
                    headers.insert(IF_NONE_MATCH, value);
                }
                Err(_) => warn!(etag = %etag, "etag is not a valid header value, ignoring"),
            },
            Err(e) => warn!(error = %e, "can't get etag, downloading unconditionally"),
        },
    }

    Decision::Fetch(headers)
}

/// `Ok(true)` when the HEAD response shows the local copy is current.
async fn check_last_modified<C: HttpClient>(
    client: &C,
    spec: &FetchSpec,
    url: &str,
    state: &DestinationState,
) -> Result<bool> {
    let response = client
        .send(HttpRequest::head(url))
        .await
        .map_err(|e| FetchError::Request {
            url:    url.to_string(),
            source: Box::new(e),
        })?;

    if response.status != StatusCode::OK {
        return Err(FetchError::BadHttpCode {
            url:    url.to_string(),
            status: response.status,
        });
    }

    let Some(value) = response.headers.get(LAST_MODIFIED) else {
        let old = is_local_old(state.modified, spec.shelf_life, SystemTime::now());
        debug!(old, shelf_life = %spec.shelf_life, "no Last-Modified, using shelf life");
        return Ok(!old);
    };

    let remote = value
        .to_str()
        .ok()
        .and_then(parse_http_date)
        .ok_or_else(|| FetchError::InvalidHeader {
            url:   url.to_string(),
            name:  LAST_MODIFIED,
            value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
        })?;

    let newer = remote_is_newer(remote, state.modified);
    debug!(last_modified = %remote, newer, "HEAD response");
    Ok(!newer)
}

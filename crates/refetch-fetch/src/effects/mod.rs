//! I/O: the HTTP client seam, the freshness decision, and the commit of a body
//! to disk.

mod client;
mod commit;
mod decide;
mod fetcher;

pub use client::{BoxStream, HttpClient, HttpRequest, HttpResponse};
pub use decide::Decision;
pub use fetcher::Fetcher;

#[cfg(feature = "reqwest")]
pub use client::ReqwestClient;

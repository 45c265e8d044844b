//! Conditional HTTP downloads with streaming verification and atomic placement.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Options, validation and freshness strategies
//! - [`core`] - Pure staleness and HTTP date logic
//! - [`effects`] - I/O operations with trait abstraction
//! - [`transform`] - Ordered body stages (gzip, size limit, digest)
//!
//! # Key Features
//!
//! - **Skip When Current**: HEAD `Last-Modified`, `If-Modified-Since` or `ETag`
//!   validators avoid re-downloading unchanged resources
//! - **Single-Pass**: the body is decoded, bounded and hashed while streaming
//! - **Atomic Placement**: a sibling staging file is renamed over the
//!   destination, or removed on any failure
//!
//! # Example
//!
//! ```no_run
//! use refetch_fetch::{FetchOptions, Fetcher, ReqwestClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let options = FetchOptions::new()
//!     .destination("/var/lib/app/hub.json")
//!     .if_modified_since()
//!     .compare_content(true);
//!
//! let fetcher = Fetcher::new(ReqwestClient::new()?, options);
//! if fetcher.fetch("https://example.com/hub.json").await? {
//!     println!("updated");
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod data;
pub mod effects;
mod error;
pub mod transform;

pub use data::{EtagFile, EtagProvider, FetchOptions, FetchSpec, FileDigest, Freshness, HashSpec, StaticEtag};
pub use effects::{BoxStream, Fetcher, HttpClient, HttpRequest, HttpResponse};
pub use error::{BoxError, ConfigError, FetchError, Result};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestClient;

pub use refetch_fs::FileMode;
pub use refetch_verify::{HashAlgorithm, HexDigest};

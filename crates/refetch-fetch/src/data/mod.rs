//! Configuration types for a fetch.
//!
//! [`FetchOptions`] is filled by setters; [`FetchOptions::validate`] turns it
//! into the immutable [`FetchSpec`] a fetch runs on.

pub mod freshness;
pub mod options;
pub mod spec;

pub use freshness::{EtagFile, EtagProvider, FileDigest, Freshness, StaticEtag};
pub use options::FetchOptions;
pub use spec::{FetchSpec, HashSpec};

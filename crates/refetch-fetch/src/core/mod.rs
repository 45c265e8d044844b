//! Pure decision logic, free of I/O.

pub mod staleness;

pub use staleness::{format_http_date, is_local_old, parse_http_date, remote_is_newer};

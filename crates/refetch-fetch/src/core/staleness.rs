use std::time::SystemTime;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Whether a local file modified at `modified` has outlived `shelf_life`.
///
/// A zero shelf life makes every file old.
pub fn is_local_old(modified: SystemTime, shelf_life: TimeDelta, now: SystemTime) -> bool {
    if shelf_life <= TimeDelta::zero() {
        return true;
    }

    let Ok(shelf_life) = shelf_life.to_std() else { return true };
    match modified.checked_add(shelf_life) {
        Some(expiry) => expiry < now,
        None => false,
    }
}

/// Whether the remote `Last-Modified` is strictly after the local mtime.
pub fn remote_is_newer(remote: DateTime<Utc>, local: SystemTime) -> bool {
    remote > DateTime::<Utc>::from(local)
}

/// Formats a timestamp as an HTTP date (`Sun, 06 Nov 1994 08:49:37 GMT`).
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(IMF_FIXDATE).to_string()
}

/// Parses an HTTP date, accepting IMF-fixdate and other RFC 2822 forms.
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, IMF_FIXDATE)
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc2822(value).map(|dt| dt.with_timezone(&Utc)))
        .ok()
}

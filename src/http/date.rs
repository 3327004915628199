//! HTTP dates (`Sun, 06 Nov 1994 08:49:37 GMT`) for `Date`, `Last-Modified`
//! and `If-Modified-Since`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub fn format(time: SystemTime) -> String {
    httpdate::fmt_http_date(time)
}

/// Parses an HTTP date. Anything unparseable is treated as absent.
pub fn parse(value: &str) -> Option<SystemTime> {
    httpdate::parse_http_date(value.trim()).ok()
}

/// Drops sub-second precision. Header dates only carry whole seconds, so
/// stored timestamps are truncated before they are compared with one.
pub fn truncate_to_seconds(time: SystemTime) -> SystemTime {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs();
    UNIX_EPOCH + Duration::from_secs(secs)
}

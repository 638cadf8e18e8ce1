//! Wall-clock helpers. All timestamps in the engine are milliseconds since
//! the UNIX epoch, stored as `i64`.

use chrono::{DateTime, Utc};

/// Milliseconds since the UNIX epoch for the current wall-clock time.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Render a millisecond timestamp as RFC 3339, or the raw number if it is
/// out of range.
pub fn format_ms(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}

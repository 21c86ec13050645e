//! Report timestamps.
//!
//! Reports are stamped in Western Indonesia Time (Asia/Jakarta), which is a
//! fixed UTC+07:00 with no daylight saving, so a fixed offset is exact.

use chrono::{DateTime, FixedOffset, Offset, Utc};

const WIB_OFFSET_SECONDS: i32 = 7 * 3600;

/// Zone label appended to displayed timestamps.
pub const WIB_LABEL: &str = "WIB";

/// The Asia/Jakarta offset.
pub fn wib() -> FixedOffset {
    FixedOffset::east_opt(WIB_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix())
}

/// Current time in WIB.
pub fn now_wib() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&wib())
}

/// `2025-01-31 14:05:09 WIB`
pub fn format_timestamp(timestamp: &DateTime<FixedOffset>) -> String {
    format!("{} {}", timestamp.format("%Y-%m-%d %H:%M:%S"), WIB_LABEL)
}

/// Two-digit year, month and day, e.g. `250131`.
pub fn datestamp(timestamp: &DateTime<FixedOffset>) -> String {
    timestamp.format("%y%m%d").to_string()
}

//! Conversion of raw device timestamps to UTC instants.
//!
//! The firmware stamps every entry with a signed millisecond count since the
//! Unix epoch, taken from whatever clock source the device last synced to.
//! Sensors deployed without network access run on local wall time, so callers
//! can shift a whole file into UTC with an hour offset.

use chrono::{DateTime, Utc};

const MS_PER_HOUR: i64 = 3_600_000;

/// Converts a raw device timestamp to an absolute UTC instant.
///
/// `absolute = epoch + raw_ms + add_tz_hours * 3600s`. The offset applies
/// uniformly and never changes relative ordering within a file.
///
/// No plausibility check is made: negative and far-future values convert
/// as-is. Values outside chrono's representable range clamp to its bounds.
pub fn normalize_ms(raw_ms: i64, add_tz_hours: i32) -> DateTime<Utc> {
    let shifted = raw_ms.saturating_add(i64::from(add_tz_hours) * MS_PER_HOUR);
    match DateTime::from_timestamp_millis(shifted) {
        Some(t) => t,
        None if shifted < 0 => DateTime::<Utc>::MIN_UTC,
        None => DateTime::<Utc>::MAX_UTC,
    }
}

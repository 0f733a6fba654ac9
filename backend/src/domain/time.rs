//! Wall-clock time arithmetic for shift scheduling.
//!
//! All other domain modules depend on this one. Times are "HH:mm" strings
//! (24-hour) with no date or timezone attached. A range whose end is before
//! its start is interpreted as crossing midnight: the end is treated as
//! end + 24h for arithmetic only. A shift is assumed never to exceed
//! 24 hours.

use crate::domain::errors::TimeError;
use shared::TimeInterval;

/// Minutes in a day, added when a range wraps past midnight.
const MINUTES_PER_DAY: i64 = 1440;

/// Convert an "HH:mm" string to its minute offset from midnight.
///
/// Accepts one- or two-digit hours ("9:00" and "09:00" both parse).
pub fn to_minutes(t: &str) -> Result<i64, TimeError> {
    let invalid = || TimeError::InvalidFormat(t.to_string());

    let (hours_part, minutes_part) = t.split_once(':').ok_or_else(invalid)?;
    if hours_part.is_empty() || hours_part.len() > 2 || minutes_part.len() != 2 {
        return Err(invalid());
    }
    if !hours_part.bytes().all(|b| b.is_ascii_digit())
        || !minutes_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let hours: i64 = hours_part.parse().map_err(|_| invalid())?;
    let minutes: i64 = minutes_part.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    Ok(hours * 60 + minutes)
}

/// Duration in minutes from `start` to `end`, wrapping past midnight when
/// the raw difference is negative.
pub fn duration_minutes(start: &str, end: &str) -> Result<i64, TimeError> {
    let diff = to_minutes(end)? - to_minutes(start)?;
    if diff < 0 {
        Ok(diff + MINUTES_PER_DAY)
    } else {
        Ok(diff)
    }
}

/// An interval as (start, end) minute offsets with the end normalized past
/// midnight where needed.
fn normalize(interval: &TimeInterval) -> Result<(i64, i64), TimeError> {
    let start = to_minutes(&interval.start)?;
    let mut end = to_minutes(&interval.end)?;
    if end < start {
        end += MINUTES_PER_DAY;
    }
    Ok((start, end))
}

/// Whether two intervals overlap. Half-open: touching endpoints do not
/// overlap, so a shift ending exactly when a class starts is disjoint.
pub fn overlaps(a: &TimeInterval, b: &TimeInterval) -> Result<bool, TimeError> {
    let (a_start, a_end) = normalize(a)?;
    let (b_start, b_end) = normalize(b)?;
    Ok(a_start < b_end && b_start < a_end)
}

/// Minutes shared by two intervals; 0 when they do not overlap, never
/// negative.
pub fn overlap_minutes(a: &TimeInterval, b: &TimeInterval) -> Result<i64, TimeError> {
    let (a_start, a_end) = normalize(a)?;
    let (b_start, b_end) = normalize(b)?;
    Ok((a_end.min(b_end) - a_start.max(b_start)).max(0))
}

/// Whether a wall-clock time falls inside a (possibly wrapping) window.
/// Half-open on the end, consistent with [`overlaps`].
pub fn contains(window: &TimeInterval, t: &str) -> Result<bool, TimeError> {
    let (start, end) = normalize(window)?;
    let mut point = to_minutes(t)?;
    if point < start {
        point += MINUTES_PER_DAY;
    }
    Ok(point >= start && point < end)
}

/// Staff-interval length in hours, rounded to one decimal place. This is
/// the cached `duration` field on shift records.
pub fn duration_hours(start: &str, end: &str) -> Result<f64, TimeError> {
    let minutes = duration_minutes(start, end)?;
    Ok((minutes as f64 / 60.0 * 10.0).round() / 10.0)
}

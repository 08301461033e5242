//! Event time window derivation.

use chrono::Datelike;

use crate::error::{AppError, Result};
use crate::models::{ClosureRecord, EventDateTime, fields};

/// Whether the closure reopens after midnight.
///
/// Only the hour digits are compared, as strings.
pub fn crosses_midnight(start_time: &str, end_time: &str) -> bool {
    start_time.get(..2) > end_time.get(..2)
}

/// Add one to the trailing day numeral of a `YYYY-MM-DD` date.
///
/// The year/month prefix is copied verbatim and the result is not zero padded,
/// so `2024-03-05` becomes `2024-03-6` and `2024-03-31` becomes `2024-03-32`.
pub fn increment_day(date: &str) -> Option<String> {
    let split = date.len().checked_sub(2)?;
    let (prefix, day) = (date.get(..split)?, date.get(split..)?);
    let day: u32 = day.parse().ok()?;
    Some(format!("{prefix}{}", day + 1))
}

/// Start and end timestamps for a closure.
pub fn event_window(
    record: &ClosureRecord,
    position: usize,
) -> Result<(EventDateTime, EventDateTime)> {
    let end_date = if crosses_midnight(&record.start_time, &record.end_time) {
        if is_last_day_of_month(record) {
            log::warn!(
                "Record #{}: closure on {} ({} -> {}) reopens in the next month; the end date keeps the same month",
                position,
                record.date,
                record.start_time,
                record.end_time
            );
        }
        increment_day(&record.date).ok_or_else(|| {
            AppError::malformed(position, fields::DATE, "has no trailing day numeral")
        })?
    } else {
        record.date.clone()
    };

    Ok((
        EventDateTime::local(&record.date, &record.start_time),
        EventDateTime::local(&end_date, &record.end_time),
    ))
}

fn is_last_day_of_month(record: &ClosureRecord) -> bool {
    record
        .start_date()
        .and_then(|date| date.succ_opt().map(|next| next.month() != date.month()))
        .unwrap_or(false)
}

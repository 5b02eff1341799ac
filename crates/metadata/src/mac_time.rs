//! Mac absolute time.
//!
//! Seconds since 2001-01-01T00:00:00 UTC, usually written with a fractional
//! part (`"599529600.123456"`).

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use time::UtcDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Unix timestamp of 2001-01-01T00:00:00 UTC.
pub const MAC_ABSOLUTE_TIME_EPOCH: i64 = 978_307_200;

/// Convert a Mac absolute time string to a UTC instant.
///
/// Only the integer part counts; the fraction is discarded, not rounded.
///
/// ```
/// use quicklook_metadata::{format_utc, mac_absolute_time};
/// let instant = mac_absolute_time("31536000.5").unwrap();
/// assert_eq!(format_utc(instant).unwrap(), "2002-01-01T00:00:00.000 UTC");
/// ```
pub fn mac_absolute_time(value: &str) -> Result<UtcDateTime> {
    let value = value.trim();
    let seconds = value.split_once('.').map_or(value, |(seconds, _)| seconds);
    let seconds: i64 = seconds.parse::<i64>().or_raise(|| ErrorKind::NotAnInteger {
        field: "timestamp",
        value: value.to_string(),
    })?;
    let timestamp = seconds
        .checked_add(MAC_ABSOLUTE_TIME_EPOCH)
        .ok_or_else(|| exn::Exn::from(ErrorKind::TimestampOutOfRange(seconds)))?;
    UtcDateTime::from_unix_timestamp(timestamp).or_raise(|| ErrorKind::TimestampOutOfRange(seconds))
}

const UTC_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3] UTC");

/// Format an instant the way cache reports show it:
/// `YYYY-MM-DDTHH:MM:SS.mmm UTC`.
pub fn format_utc(instant: UtcDateTime) -> Result<String> {
    instant.format(UTC_FORMAT).or_raise(|| ErrorKind::Format)
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! `YYYY-MM-DD HH:MM:SS` parsing and formatting.
//!
//! This is the format operators type into admin tools and config files
//! (event start times, maintenance windows). Fields are read as wall time in
//! the zone supplied by the caller.

use crate::error::FormatError;
use chrono::{DateTime, NaiveDate, TimeZone};
use regex::Regex;
use std::fmt::Display;
use std::sync::LazyLock;

/// `strftime` pattern for a full date-time.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `strftime` pattern for a date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static DATETIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)-(\d+)-(\d+) (\d+):(\d+):(\d+)\s*$").unwrap()
});

/// Parse `value` as wall time in `zone`.
///
/// Leading zeros are optional (`2023-6-5 8:3:0` is accepted). A wall time
/// repeated by a DST fall-back resolves to its earlier instant; one skipped
/// by a DST gap is reported as [`FormatError::OutOfRange`].
///
/// # Examples
///
/// ```
/// use chrono::{Datelike, Timelike};
/// use servertime::parse_datetime;
///
/// let t = parse_datetime("2023-06-15 08:30:00", &chrono_tz::Asia::Shanghai).unwrap();
/// assert_eq!((t.year(), t.month(), t.day()), (2023, 6, 15));
/// assert_eq!((t.hour(), t.minute(), t.second()), (8, 30, 0));
///
/// assert!(parse_datetime("not-a-date", &chrono::Utc).is_err());
/// ```
pub fn parse_datetime<Z: TimeZone>(value: &str, zone: &Z) -> Result<DateTime<Z>, FormatError> {
    let caps = DATETIME_REGEX
        .captures(value)
        .ok_or_else(|| FormatError::Malformed(value.to_owned()))?;

    let field = |index: usize, name: &'static str| -> Result<u32, FormatError> {
        caps[index].parse::<u32>().map_err(|_| out_of_range(value, name))
    };

    let year = i32::try_from(field(1, "year")?).map_err(|_| out_of_range(value, "year"))?;
    let (month, day) = (field(2, "month")?, field(3, "day")?);
    let (hour, minute, second) = (field(4, "hour")?, field(5, "minute")?, field(6, "second")?);

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        out_of_range(value, if (1..=12).contains(&month) { "day" } else { "month" })
    })?;
    let local = date
        .and_hms_opt(hour, minute, second)
        .ok_or_else(|| out_of_range(value, "time of day"))?;

    zone.from_local_datetime(&local)
        .earliest()
        .ok_or_else(|| out_of_range(value, "local time"))
}

/// Render `instant` as `YYYY-MM-DD HH:MM:SS` in its own zone.
pub fn format_datetime<Z>(instant: &DateTime<Z>) -> String
where
    Z: TimeZone,
    Z::Offset: Display,
{
    instant.format(DATETIME_FORMAT).to_string()
}

/// Render `instant` as `YYYY-MM-DD` in its own zone.
pub fn format_date<Z>(instant: &DateTime<Z>) -> String
where
    Z: TimeZone,
    Z::Offset: Display,
{
    instant.format(DATE_FORMAT).to_string()
}

fn out_of_range(value: &str, field: &'static str) -> FormatError {
    FormatError::OutOfRange {
        input: value.to_owned(),
        field,
    }
}

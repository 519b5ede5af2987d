// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Calendar arithmetic for reset schedules.
//!
//! Every function here is pure and generic over the instant's
//! [`TimeZone`]: calendar fields (date, hour, weekday) are read in the zone
//! the instant carries, and results are returned in that same zone.
//!
//! Days have a fixed length of 24 h. Shifting "by n days" adds `n × 86 400 s`
//! to the instant rather than moving the wall-clock date, so no DST
//! adjustment is applied. When a wall time has to be built from fields and
//! falls into a DST gap, the offset in force just before the gap is used, which
//! lands on the first instant after the gap; an ambiguous wall time resolves to
//! its earlier instant. Results past chrono's range saturate to
//! `DateTime::<Utc>::MAX_UTC` / `DateTime::<Utc>::MIN_UTC` in the
//! instant's zone. Every function is therefore total.
//!
//! # Boundary predicates
//!
//! | Function | True when |
//! |----------|-----------|
//! | [`crossed_day`] | `now`'s date is later than `base`'s |
//! | [`crossed_week`] | `now`'s ISO week is later than `base`'s |
//! | [`crossed_month`] | `now`'s (year, month) is later than `base`'s |
//! | [`same_calendar_day`] | both instants share a **UTC** date |
//! | [`same_calendar_day_fast`] | two second timestamps are < 24 h apart |

use chrono::{
    DateTime, Datelike, LocalResult, Month, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeDelta, TimeZone, Timelike, Utc,
};
use qtty::{Day, Days, Seconds};

pub const NANOS_PER_MILLI: i64 = 1_000_000;
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;
pub const MILLIS_PER_SECOND: i64 = 1_000;
pub const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
pub const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

// ═══════════════════════════════════════════════════════════════════════════
// Timestamps
// ═══════════════════════════════════════════════════════════════════════════

/// Nanoseconds since the Unix epoch, saturating outside the i64 range.
pub fn unix_nanos<Z: TimeZone>(instant: &DateTime<Z>) -> i64 {
    instant.timestamp_nanos_opt().unwrap_or(if instant.timestamp() < 0 {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Instant for a nanosecond timestamp, expressed in `zone`.
#[inline]
pub fn from_unix_nanos<Z: TimeZone>(zone: &Z, nanos: i64) -> DateTime<Z> {
    zone.timestamp_nanos(nanos)
}

/// Instant for a second timestamp, expressed in `zone`.
///
/// Timestamps beyond the nanosecond range (about ±292 years around 1970)
/// saturate to its ends.
#[inline]
pub fn from_unix_seconds<Z: TimeZone>(zone: &Z, seconds: i64) -> DateTime<Z> {
    from_unix_nanos(zone, seconds.saturating_mul(NANOS_PER_SECOND))
}

/// Last (`forward`) or first representable instant, in `zone`.
fn saturated<Z: TimeZone>(zone: &Z, forward: bool) -> DateTime<Z> {
    let bound = if forward {
        DateTime::<Utc>::MAX_UTC
    } else {
        DateTime::<Utc>::MIN_UTC
    };
    zone.from_utc_datetime(&bound.naive_utc())
}

/// `instant` moved by `millis`, saturating when the shift or the result is
/// out of range.
fn shift_millis<Z: TimeZone>(
    instant: DateTime<Z>,
    millis: Option<i64>,
    forward: bool,
) -> DateTime<Z> {
    let zone = instant.timezone();
    millis
        .and_then(TimeDelta::try_milliseconds)
        .and_then(|delta| instant.checked_add_signed(delta))
        .unwrap_or_else(|| saturated(&zone, forward))
}

/// Map a wall time in `zone` to an instant.
fn resolve_local<Z: TimeZone>(zone: &Z, local: NaiveDateTime) -> DateTime<Z> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(t) => t,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            // DST gap: apply the offset of the last instant before it.
            let offset = local
                .checked_sub_signed(TimeDelta::hours(1))
                .and_then(|before| zone.from_local_datetime(&before).earliest())
                .map(|before| before.offset().fix())
                .unwrap_or_else(|| zone.offset_from_utc_datetime(&local).fix());
            local
                .checked_sub_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))
                .map(|utc| zone.from_utc_datetime(&utc))
                .unwrap_or_else(|| saturated(zone, local.year() >= 1970))
        }
    }
}

/// Wall time at `hours` after the start of `date`, normalised across days.
fn date_plus_hours<Z: TimeZone>(zone: &Z, date: NaiveDate, hours: i64) -> DateTime<Z> {
    TimeDelta::try_hours(hours)
        .and_then(|delta| date.and_time(NaiveTime::MIN).checked_add_signed(delta))
        .map(|local| resolve_local(zone, local))
        .unwrap_or_else(|| saturated(zone, hours >= 0))
}

// ═══════════════════════════════════════════════════════════════════════════
// Midnight and sharp hours
// ═══════════════════════════════════════════════════════════════════════════

/// `00:00:00` of the instant's calendar date, in its zone.
///
/// Idempotent, and never later than `instant`.
pub fn midnight<Z: TimeZone>(instant: &DateTime<Z>) -> DateTime<Z> {
    date_plus_hours(&instant.timezone(), instant.date_naive(), 0)
}

/// [`midnight`] moved by `days` fixed-length days (`days` may be negative).
pub fn midnight_plus_days<Z: TimeZone>(instant: &DateTime<Z>, days: i64) -> DateTime<Z> {
    shift_millis(midnight(instant), days.checked_mul(MILLIS_PER_DAY), days >= 0)
}

/// The instant floored to the hour.
///
/// Minutes, seconds and sub-seconds are taken off the instant itself, so a
/// repeated wall-clock hour (DST fall-back) floors within the same offset.
pub fn sharp_hour<Z: TimeZone>(instant: &DateTime<Z>) -> DateTime<Z> {
    let past_hour = i64::from(instant.minute()) * 60 + i64::from(instant.second());
    let past_hour = TimeDelta::seconds(past_hour)
        + TimeDelta::nanoseconds(i64::from(instant.nanosecond()));
    instant
        .clone()
        .checked_sub_signed(past_hour)
        .unwrap_or_else(|| saturated(&instant.timezone(), false))
}

/// Start of the next hour.
pub fn next_sharp_hour<Z: TimeZone>(instant: &DateTime<Z>) -> DateTime<Z> {
    next_sharp_hour_plus(instant, 1)
}

/// Start of the hour `hours` after the current one.
///
/// An hour past 23 rolls into the following days, so `hour + hours == 25`
/// lands at 01:00 the next day.
pub fn next_sharp_hour_plus<Z: TimeZone>(instant: &DateTime<Z>, hours: i64) -> DateTime<Z> {
    date_plus_hours(
        &instant.timezone(),
        instant.date_naive(),
        i64::from(instant.hour()).saturating_add(hours),
    )
}

/// Time elapsed since [`sharp_hour`]; always in `[0, 1h)`.
pub fn time_since_sharp_hour<Z: TimeZone>(instant: &DateTime<Z>) -> TimeDelta {
    instant.clone() - sharp_hour(instant)
}

// ═══════════════════════════════════════════════════════════════════════════
// Same-day tests
// ═══════════════════════════════════════════════════════════════════════════

/// Whether both instants fall on the same date **in UTC**.
///
/// The zones the instants carry are ignored on purpose; use
/// [`crossed_day`] for a comparison in a local zone.
pub fn same_calendar_day<A: TimeZone, B: TimeZone>(a: &DateTime<A>, b: &DateTime<B>) -> bool {
    a.naive_utc().date() == b.naive_utc().date()
}

/// Whether two second timestamps are less than one day apart.
///
/// This is a cheap heuristic, not a calendar test: `23:59:59` and the
/// following `00:00:00` are "the same day" here.
pub fn same_calendar_day_fast(seconds_a: i64, seconds_b: i64) -> bool {
    let millis = seconds_a
        .abs_diff(seconds_b)
        .saturating_mul(MILLIS_PER_SECOND as u64);
    millis < MILLIS_PER_DAY as u64
}

// ═══════════════════════════════════════════════════════════════════════════
// Week / month boundaries
// ═══════════════════════════════════════════════════════════════════════════

/// Midnight of the next Monday after `instant`'s date, in its zone.
///
/// Sunday is the last day of the week, so a Sunday instant returns the very
/// next day and a Monday instant returns the Monday a week later.
pub fn next_week_boundary<Z: TimeZone>(instant: &DateTime<Z>) -> DateTime<Z> {
    let days_left = 7 - i64::from(instant.weekday().num_days_from_monday());
    midnight_plus_days(instant, days_left)
}

/// Midnight of the first day of the month after `instant`'s, in its zone.
pub fn next_month_boundary<Z: TimeZone>(instant: &DateTime<Z>) -> DateTime<Z> {
    let (year, month) = match instant.month() {
        12 => (instant.year() + 1, 1),
        m => (instant.year(), m + 1),
    };
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(first) => date_plus_hours(&instant.timezone(), first, 0),
        None => saturated(&instant.timezone(), true),
    }
}

/// Whether `now` is in a later ISO week than `base`.
pub fn crossed_week<Z: TimeZone>(base: &DateTime<Z>, now: &DateTime<Z>) -> bool {
    let (base_week, now_week) = (base.iso_week(), now.iso_week());
    let (base_year, now_year) = (base_week.year(), now_week.year());

    if base_year == now_year {
        return now_week.week() > base_week.week();
    }
    if now_year < base_year {
        return false;
    }
    now_year - base_year > 1 || now_week.week() > 1 || *now >= next_week_boundary(base)
}

/// Whether `now`'s calendar date is later than `base`'s.
pub fn crossed_day<Z: TimeZone>(base: &DateTime<Z>, now: &DateTime<Z>) -> bool {
    (now.year(), now.month(), now.day()) > (base.year(), base.month(), base.day())
}

/// Whether `now`'s (year, month) is later than `base`'s.
pub fn crossed_month<Z: TimeZone>(base: &DateTime<Z>, now: &DateTime<Z>) -> bool {
    (now.year(), now.month()) > (base.year(), base.month())
}

// ═══════════════════════════════════════════════════════════════════════════
// Day counts
// ═══════════════════════════════════════════════════════════════════════════

/// Gregorian leap-year rule.
pub const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`.
pub fn days_in_month(year: i32, month: Month) -> u32 {
    match month {
        Month::February if is_leap_year(year) => 29,
        m => DAYS_IN_MONTH[m.number_from_month() as usize - 1],
    }
}

/// Whole calendar days from `seconds_a`'s date to `seconds_b`'s date in
/// `zone` (negative when `b` is earlier).
pub fn delta_calendar_days<Z: TimeZone>(zone: &Z, seconds_a: i64, seconds_b: i64) -> i64 {
    let a = midnight(&from_unix_seconds(zone, seconds_a));
    let b = midnight(&from_unix_seconds(zone, seconds_b));
    (b - a).num_milliseconds() / MILLIS_PER_DAY
}

/// Fractional days from `a` to `b`.
pub fn span_days<A: TimeZone, B: TimeZone>(a: &DateTime<A>, b: &DateTime<B>) -> Days {
    let delta = b.with_timezone(&Utc) - a.with_timezone(&Utc);
    let seconds = match delta.num_nanoseconds() {
        Some(ns) => ns as f64 / NANOS_PER_SECOND as f64,
        None => delta.num_seconds() as f64,
    };
    Seconds::new(seconds).to::<Day>()
}

// ═══════════════════════════════════════════════════════════════════════════
// Reset periods
// ═══════════════════════════════════════════════════════════════════════════

/// Cadence of a periodic reset (daily quests, weekly ladders, monthly billing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ResetPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl ResetPeriod {
    /// Whether a reset of this cadence happened between `base` and `now`.
    pub fn crossed<Z: TimeZone>(self, base: &DateTime<Z>, now: &DateTime<Z>) -> bool {
        match self {
            ResetPeriod::Daily => crossed_day(base, now),
            ResetPeriod::Weekly => crossed_week(base, now),
            ResetPeriod::Monthly => crossed_month(base, now),
        }
    }

    /// The next reset instant strictly after `instant`'s period start.
    pub fn next_boundary<Z: TimeZone>(self, instant: &DateTime<Z>) -> DateTime<Z> {
        match self {
            ResetPeriod::Daily => midnight_plus_days(instant, 1),
            ResetPeriod::Weekly => next_week_boundary(instant),
            ResetPeriod::Monthly => next_month_boundary(instant),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

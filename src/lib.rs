// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Server time
//!
//! A corrected server clock plus the calendar arithmetic game and application
//! servers use to schedule resets (daily quests, weekly leaderboards, monthly
//! billing).
//!
//! # Core types
//!
//! - [`CorrectedClock`] — host clock minus an offset learned from a trusted
//!   reference, bound to the server time zone.
//! - [`WallClock`] — source of uncorrected time; [`SystemClock`] for the host,
//!   [`ManualClock`] for tests.
//! - [`ResetPeriod`] — daily / weekly / monthly reset cadence.
//! - [`ClockConfig`] — zone configuration with host-zone fallback.
//!
//! # Calendar functions
//!
//! | Function | Result |
//! |----------|--------|
//! | [`midnight`] | `00:00` of the same date |
//! | [`midnight_plus_days`] | [`midnight`] shifted by whole 24 h days |
//! | [`sharp_hour`] / [`next_sharp_hour`] / [`next_sharp_hour_plus`] | hour boundaries |
//! | [`time_since_sharp_hour`] | elapsed time in the current hour |
//! | [`next_week_boundary`] | next Monday `00:00` |
//! | [`crossed_day`] / [`crossed_week`] / [`crossed_month`] | boundary crossings |
//! | [`same_calendar_day`] / [`same_calendar_day_fast`] | same-day tests |
//! | [`days_in_month`] / [`delta_calendar_days`] | day counts |
//!
//! All of them are generic over [`chrono::TimeZone`] and read calendar fields
//! in the zone the instant carries.
//!
//! ```
//! use servertime::{crossed_day, midnight, CorrectedClock, ManualClock};
//! use chrono::TimeZone;
//! use chrono_tz::Asia::Shanghai;
//!
//! let last_login = Shanghai.with_ymd_and_hms(2024, 5, 1, 23, 30, 0).unwrap();
//! let host = ManualClock::at(&last_login);
//! let clock = CorrectedClock::with_source(host.clone(), Shanghai);
//!
//! host.advance(chrono::TimeDelta::hours(1));
//! let now = clock.now();
//! assert!(crossed_day(&last_login, &now));
//! assert_eq!(midnight(&now), Shanghai.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap());
//! ```

pub mod calendar;
mod clock;
mod config;
mod error;
pub mod humanize;
mod parse;
pub mod zone;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use calendar::{
    crossed_day, crossed_month, crossed_week, days_in_month, delta_calendar_days, is_leap_year,
    midnight, midnight_plus_days, next_month_boundary, next_sharp_hour, next_sharp_hour_plus,
    next_week_boundary, same_calendar_day, same_calendar_day_fast, sharp_hour, span_days,
    time_since_sharp_hour, ResetPeriod,
};
pub use clock::{CorrectedClock, ManualClock, SystemClock, WallClock};
pub use config::{ClockConfig, ZONE_ENV};
pub use error::{FormatError, ZoneError};
pub use parse::{format_date, format_datetime, parse_datetime, DATETIME_FORMAT, DATE_FORMAT};
pub use zone::{load_zone, try_load_zone, DEFAULT_ZONE_NAME};

pub use chrono_tz::Tz;

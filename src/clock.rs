// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Corrected server clock.
//!
//! [`CorrectedClock`] keeps a signed offset between the host wall clock and a
//! trusted reference time (a master server, a persisted checkpoint, ...):
//!
//! ```text
//! offset = host_now_at_reset - reference
//! now    = host_now - offset
//! ```
//!
//! The host clock is read through the [`WallClock`] trait so that tests can
//! drive time explicitly with a [`ManualClock`].
//!
//! The corrected time is wall-clock time, not a monotonic clock: it follows
//! the host clock between resets and may jump on [`CorrectedClock::reset_time`].

use crate::calendar::{self, NANOS_PER_MILLI, NANOS_PER_SECOND};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::debug;

// ═══════════════════════════════════════════════════════════════════════════
// WallClock
// ═══════════════════════════════════════════════════════════════════════════

/// Source of uncorrected wall-clock time, in nanoseconds since the Unix epoch.
pub trait WallClock: Send + Sync {
    fn now_nanos(&self) -> i64;
}

impl<T: WallClock + ?Sized> WallClock for Arc<T> {
    #[inline]
    fn now_nanos(&self) -> i64 {
        (**self).now_nanos()
    }
}

impl<T: WallClock + ?Sized> WallClock for &T {
    #[inline]
    fn now_nanos(&self) -> i64 {
        (**self).now_nanos()
    }
}

/// The host clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now_nanos(&self) -> i64 {
        // Saturates past 2262-04-11, the end of the i64 nanosecond range.
        Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
    }
}

/// A wall clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the clock under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(nanos: i64) -> Self {
        Self {
            nanos: Arc::new(AtomicI64::new(nanos)),
        }
    }

    /// Start at the given instant.
    pub fn at<Z: TimeZone>(instant: &DateTime<Z>) -> Self {
        Self::new(calendar::unix_nanos(instant))
    }

    pub fn set(&self, nanos: i64) {
        self.nanos.store(nanos, Ordering::Release);
    }

    /// Move the reading by `delta` (may be negative).
    pub fn advance(&self, delta: TimeDelta) {
        let step = delta.num_nanoseconds().unwrap_or(if delta < TimeDelta::zero() {
            i64::MIN
        } else {
            i64::MAX
        });
        let _ = self
            .nanos
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                Some(n.saturating_add(step))
            });
    }
}

impl WallClock for ManualClock {
    fn now_nanos(&self) -> i64 {
        self.nanos.load(Ordering::Acquire)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CorrectedClock
// ═══════════════════════════════════════════════════════════════════════════

/// Server "now", corrected against a trusted reference and bound to the
/// server time zone.
///
/// Share it behind an `Arc`: every method takes `&self`, and the offset is a
/// single atomic word, so [`reset_time`](Self::reset_time) may race with any
/// number of readers without torn values.
///
/// # Examples
///
/// ```
/// use servertime::{CorrectedClock, ManualClock};
///
/// let host = ManualClock::new(5_000_000_000);
/// let clock = CorrectedClock::with_source(host.clone(), chrono_tz::Tz::UTC);
///
/// // The trusted source says it is 2 s after the epoch; the host says 5 s.
/// clock.reset_time(2_000_000_000);
/// assert_eq!(clock.offset(), 3_000_000_000);
/// assert_eq!(clock.now_seconds(), 2);
/// ```
#[derive(Debug)]
pub struct CorrectedClock<C: WallClock = SystemClock> {
    source: C,
    offset: AtomicI64,
    zone: Tz,
}

impl CorrectedClock<SystemClock> {
    /// A clock on the host wall clock with a zero offset.
    pub fn new(zone: Tz) -> Self {
        Self::with_source(SystemClock, zone)
    }
}

impl<C: WallClock> CorrectedClock<C> {
    pub fn with_source(source: C, zone: Tz) -> Self {
        Self {
            source,
            offset: AtomicI64::new(0),
            zone,
        }
    }

    /// The underlying wall clock.
    pub fn source(&self) -> &C {
        &self.source
    }

    /// Zone every instant produced by this clock is expressed in.
    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Align the clock with a reference time in nanoseconds since the epoch.
    ///
    /// May be called again at any time to resync; the last call wins.
    pub fn reset_time(&self, reference_nanos: i64) {
        let offset = self.source.now_nanos().saturating_sub(reference_nanos);
        self.offset.store(offset, Ordering::Release);
        debug!(
            reference_ns = reference_nanos,
            offset_ns = offset,
            "server clock offset reset"
        );
    }

    /// [`reset_time`](Self::reset_time) for a reference in milliseconds.
    pub fn reset_time_millis(&self, reference_millis: i64) {
        self.reset_time(reference_millis.saturating_mul(NANOS_PER_MILLI));
    }

    /// [`reset_time`](Self::reset_time) for a reference instant.
    pub fn reset_to<Z: TimeZone>(&self, reference: &DateTime<Z>) {
        self.reset_time(calendar::unix_nanos(reference));
    }

    /// Current offset (`host - reference`) in nanoseconds.
    pub fn offset(&self) -> i64 {
        self.offset.load(Ordering::Acquire)
    }

    #[inline]
    pub fn now_nanos(&self) -> i64 {
        self.source.now_nanos().saturating_sub(self.offset())
    }

    #[inline]
    pub fn now_millis(&self) -> i64 {
        self.now_nanos() / NANOS_PER_MILLI
    }

    #[inline]
    pub fn now_seconds(&self) -> i64 {
        self.now_nanos() / NANOS_PER_SECOND
    }

    /// Corrected now in the server zone.
    pub fn now(&self) -> DateTime<Tz> {
        self.nanos_to_time(self.now_nanos())
    }

    /// Project a nanosecond timestamp into the server zone.
    pub fn nanos_to_time(&self, nanos: i64) -> DateTime<Tz> {
        calendar::from_unix_nanos(&self.zone, nanos)
    }

    /// Project a second timestamp into the server zone.
    pub fn seconds_to_time(&self, seconds: i64) -> DateTime<Tz> {
        calendar::from_unix_seconds(&self.zone, seconds)
    }

    /// Whether two second timestamps are less than 24 h apart.
    ///
    /// See [`calendar::same_calendar_day_fast`]; the server zone plays no part.
    pub fn same_day_fast(&self, seconds_a: i64, seconds_b: i64) -> bool {
        calendar::same_calendar_day_fast(seconds_a, seconds_b)
    }

    /// Whole calendar days between two second timestamps, counted in the
    /// server zone.
    pub fn delta_days(&self, seconds_a: i64, seconds_b: i64) -> i64 {
        calendar::delta_calendar_days(&self.zone, seconds_a, seconds_b)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const SECOND: i64 = NANOS_PER_SECOND;

    fn manual(start: i64) -> (ManualClock, CorrectedClock<ManualClock>) {
        let host = ManualClock::new(start);
        let clock = CorrectedClock::with_source(host.clone(), Tz::UTC);
        (host, clock)
    }

    #[test]
    fn zero_offset_until_reset() {
        let (_, clock) = manual(42 * SECOND);
        assert_eq!(clock.offset(), 0);
        assert_eq!(clock.now_nanos(), 42 * SECOND);
    }

    #[test]
    fn host_ahead_gives_positive_offset() {
        let (host, clock) = manual(100 * SECOND);
        clock.reset_time(40 * SECOND);
        assert_eq!(clock.offset(), 60 * SECOND);
        assert_eq!(clock.now_seconds(), 40);

        host.advance(TimeDelta::seconds(5));
        assert_eq!(clock.now_seconds(), 45);
    }

    #[test]
    fn host_behind_gives_negative_offset() {
        let (_, clock) = manual(10 * SECOND);
        clock.reset_time(25 * SECOND);
        assert_eq!(clock.offset(), -15 * SECOND);
        assert_eq!(clock.now_nanos(), 25 * SECOND);
    }

    #[test]
    fn last_reset_wins() {
        let (_, clock) = manual(1_000 * SECOND);
        clock.reset_time(10 * SECOND);
        clock.reset_time(20 * SECOND);
        assert_eq!(clock.now_seconds(), 20);
    }

    #[test]
    fn reset_time_millis_and_reset_to() {
        let (_, clock) = manual(0);
        clock.reset_time_millis(1_500);
        assert_eq!(clock.now_millis(), 1_500);

        let reference = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        clock.reset_to(&reference);
        assert_eq!(clock.now(), reference);
    }

    #[test]
    fn resolutions_truncate() {
        let (_, clock) = manual(1_999_999_999);
        assert_eq!(clock.now_seconds(), 1);
        assert_eq!(clock.now_millis(), 1_999);

        let (_, clock) = manual(-1_500_000_000);
        assert_eq!(clock.now_seconds(), -1);
        assert_eq!(clock.now_millis(), -1_500);
    }

    #[test]
    fn now_is_in_the_server_zone() {
        let host = ManualClock::at(&Utc.with_ymd_and_hms(2023, 6, 15, 20, 30, 0).unwrap());
        let clock = CorrectedClock::with_source(host, Tz::Asia__Shanghai);
        let now = clock.now();
        assert_eq!(now.timezone(), Tz::Asia__Shanghai);
        assert_eq!((now.day(), now.hour(), now.minute()), (16, 4, 30));
    }

    #[test]
    fn seconds_to_time_and_delta_days_use_server_zone() {
        let clock = CorrectedClock::with_source(ManualClock::new(0), Tz::Asia__Shanghai);
        // 2023-06-15 15:59:59 UTC is 23:59:59 in Shanghai; one second later is the next day.
        let a = Utc.with_ymd_and_hms(2023, 6, 15, 15, 59, 59).unwrap().timestamp();
        assert_eq!(clock.seconds_to_time(a).day(), 15);
        assert_eq!(clock.seconds_to_time(a + 1).day(), 16);
        assert_eq!(clock.delta_days(a, a + 1), 1);
        assert_eq!(clock.delta_days(a + 1, a), -1);
    }

    #[test]
    fn same_day_fast_is_a_sliding_window() {
        let (_, clock) = manual(0);
        // 23:59:59 and the following 00:00:00 count as one day here.
        let late = Utc.with_ymd_and_hms(2023, 6, 15, 23, 59, 59).unwrap().timestamp();
        assert!(clock.same_day_fast(late, late + 1));
        assert!(clock.same_day_fast(late + 86_399, late));
        assert!(!clock.same_day_fast(late, late + 86_400));
    }

    #[test]
    fn manual_clock_set_moves_the_corrected_time() {
        let (host, clock) = manual(100 * SECOND);
        clock.reset_time(40 * SECOND);

        host.set(500 * SECOND);
        assert_eq!(clock.source().now_nanos(), 500 * SECOND);
        assert_eq!(clock.now_seconds(), 440);

        // Jumping the host back keeps the learned offset.
        host.set(0);
        assert_eq!(clock.offset(), 60 * SECOND);
        assert_eq!(clock.now_seconds(), -60);
    }

    #[test]
    fn source_is_the_wrapped_clock() {
        let host = Arc::new(ManualClock::new(7));
        let clock = CorrectedClock::with_source(Arc::clone(&host), Tz::UTC);
        assert!(Arc::ptr_eq(clock.source(), &host));

        clock.source().advance(TimeDelta::nanoseconds(3));
        assert_eq!(host.now_nanos(), 10);
        assert_eq!(clock.now_nanos(), 10);
    }

    #[test]
    fn system_clock_roundtrip_is_within_tolerance() {
        let clock = CorrectedClock::new(Tz::UTC);
        let reference = 1_700_000_000 * SECOND;
        clock.reset_time(reference);
        let drift = clock.now_nanos() - reference;
        assert!((0..50_000_000).contains(&drift), "drift = {drift} ns");
    }

    #[test]
    fn manual_clock_advance_saturates() {
        let host = ManualClock::new(i64::MAX - 1);
        host.advance(TimeDelta::seconds(1));
        assert_eq!(host.now_nanos(), i64::MAX);
        host.advance(TimeDelta::seconds(-1));
        assert_eq!(host.now_nanos(), i64::MAX - SECOND);
    }

    #[test]
    fn concurrent_resets_never_tear() {
        let (_, clock) = manual(0);
        let a = 0x0000_0000_FFFF_FFFF_i64;
        let b = -0x7FFF_FFFF_0000_0000_i64;
        clock.reset_time(-a);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..10_000 {
                    clock.reset_time(if i % 2 == 0 { -b } else { -a });
                }
            });
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..10_000 {
                        let offset = clock.offset();
                        assert!(offset == a || offset == b, "torn offset {offset:#x}");
                    }
                });
            }
        });
    }
}

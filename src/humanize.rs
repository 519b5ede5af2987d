// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Short human-readable renderings for log lines and admin consoles.

use chrono::TimeDelta;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000 * NANOS_PER_MICRO;
const NANOS_PER_SECOND: u128 = 1_000 * NANOS_PER_MILLI;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

fn total_nanos(delta: TimeDelta) -> i128 {
    i128::from(delta.num_seconds()) * NANOS_PER_SECOND as i128 + i128::from(delta.subsec_nanos())
}

/// Compact duration with two decimals in the largest fitting unit.
///
/// ```
/// use chrono::TimeDelta;
/// use servertime::humanize::short_duration;
///
/// assert_eq!(short_duration(TimeDelta::zero()), "0");
/// assert_eq!(short_duration(TimeDelta::microseconds(1_500)), "1.50ms");
/// assert_eq!(short_duration(TimeDelta::minutes(90)), "1.50h");
/// assert_eq!(short_duration(TimeDelta::seconds(-3)), "-3.00s");
/// ```
pub fn short_duration(delta: TimeDelta) -> String {
    let nanos = total_nanos(delta);
    let sign = if nanos < 0 { "-" } else { "" };
    let n = nanos.unsigned_abs();
    let scaled = |unit: u128| n as f64 / unit as f64;

    match n {
        0 => "0".to_owned(),
        n if n < NANOS_PER_MICRO => format!("{sign}{:.2}ns", n as f64),
        n if n < NANOS_PER_MILLI => format!("{sign}{:.2}us", scaled(NANOS_PER_MICRO)),
        n if n < NANOS_PER_SECOND => format!("{sign}{:.2}ms", scaled(NANOS_PER_MILLI)),
        n if n < NANOS_PER_MINUTE => format!("{sign}{:.2}s", scaled(NANOS_PER_SECOND)),
        n if n < NANOS_PER_HOUR => format!("{sign}{:.2}m", scaled(NANOS_PER_MINUTE)),
        _ => format!("{sign}{:.2}h", scaled(NANOS_PER_HOUR)),
    }
}

/// Mean of `items`, truncated to the nanosecond; `None` when empty.
pub fn average(items: &[TimeDelta]) -> Option<TimeDelta> {
    if items.is_empty() {
        return None;
    }
    let sum: i128 = items.iter().map(|d| total_nanos(*d)).sum();
    let mean = sum / items.len() as i128;
    let per_second = NANOS_PER_SECOND as i128;
    Some(
        TimeDelta::seconds((mean / per_second) as i64)
            + TimeDelta::nanoseconds((mean % per_second) as i64),
    )
}

/// Byte count in `B`, `K`, `M` or `G` (binary multiples).
pub fn bytes(count: u64) -> String {
    match count {
        c if c < KIB => format!("{c}B"),
        c if c < MIB => format!("{:.2}K", c as f64 / KIB as f64),
        c if c < GIB => format!("{:.2}M", c as f64 / MIB as f64),
        c => format!("{:.2}G", c as f64 / GIB as f64),
    }
}

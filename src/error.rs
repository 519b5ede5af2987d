// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Error types.
//!
//! Calendar arithmetic and the corrected clock never fail; errors only come
//! from the two places where untrusted text enters the crate: date-time
//! strings and time-zone names.

use thiserror::Error;

/// A date-time string could not be turned into an instant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The input does not have the `YYYY-MM-DD HH:MM:SS` shape.
    #[error("time [{0}] format error, expected format: 2006-01-02 15:04:05")]
    Malformed(String),

    /// The input has the right shape but a field is out of range
    /// (month 13, hour 24, a number too large to represent, ...).
    #[error("time [{input}] has an out-of-range {field}")]
    OutOfRange { input: String, field: &'static str },
}

/// A time-zone name could not be resolved against the IANA database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoneError {
    #[error("unknown time zone '{0}'")]
    Unknown(String),

    #[error("cannot determine host time zone: {0}")]
    Host(String),
}

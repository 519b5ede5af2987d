// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Clock configuration.

use crate::clock::{CorrectedClock, SystemClock, WallClock};
use crate::zone::{load_zone, DEFAULT_ZONE_NAME};
use chrono_tz::Tz;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Environment variable holding the server zone name.
pub const ZONE_ENV: &str = "SERVERTIME_ZONE";

/// Settings for the server clock.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockConfig {
    /// IANA name of the calendar zone (e.g. `"Asia/Shanghai"`, `"Hongkong"`).
    #[cfg_attr(feature = "serde", serde(default = "default_zone"))]
    pub zone: String,
}

fn default_zone() -> String {
    DEFAULT_ZONE_NAME.to_owned()
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            zone: default_zone(),
        }
    }
}

impl ClockConfig {
    pub fn new(zone: impl Into<String>) -> Self {
        Self { zone: zone.into() }
    }

    /// Read [`ZONE_ENV`] from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; blank values count as unset.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(ZONE_ENV) {
            Some(zone) if !zone.trim().is_empty() => Self::new(zone.trim()),
            _ => Self::default(),
        }
    }

    /// Resolve the zone, falling back to the host zone when it is unknown.
    pub fn resolve_zone(&self) -> Tz {
        load_zone(&self.zone)
    }

    /// A host-clock [`CorrectedClock`] in the configured zone.
    pub fn build(&self) -> CorrectedClock<SystemClock> {
        CorrectedClock::new(self.resolve_zone())
    }

    /// A [`CorrectedClock`] on a custom wall clock in the configured zone.
    pub fn build_with<C: WallClock>(&self, source: C) -> CorrectedClock<C> {
        CorrectedClock::with_source(source, self.resolve_zone())
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Server time-zone resolution.
//!
//! The server computes every calendar boundary in one configured zone. The
//! zone is resolved once, at startup, and a failure to load it never stops
//! the process: the host zone is used instead and a single warning is logged.
//!
//! | Function | On unknown name |
//! |----------|-----------------|
//! | [`try_load_zone`] | returns [`ZoneError::Unknown`] |
//! | [`load_zone`] | falls back to [`host_zone`] with a `warn!` |

use crate::error::ZoneError;
use chrono_tz::Tz;
use tracing::{debug, warn};

/// Zone used when nothing else is configured.
pub const DEFAULT_ZONE_NAME: &str = "Asia/Shanghai";

/// Look up an IANA zone name (e.g. `"Asia/Shanghai"`, `"Hongkong"`).
pub fn try_load_zone(name: &str) -> Result<Tz, ZoneError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ZoneError::Unknown(name.to_owned()))
}

/// The zone the host is configured with.
pub fn try_host_zone() -> Result<Tz, ZoneError> {
    let name = iana_time_zone::get_timezone().map_err(|e| ZoneError::Host(e.to_string()))?;
    try_load_zone(&name)
}

/// The host zone, or UTC when the host does not expose one.
pub fn host_zone() -> Tz {
    match try_host_zone() {
        Ok(zone) => zone,
        Err(err) => {
            warn!(error = %err, "host time zone unavailable, using UTC");
            Tz::UTC
        }
    }
}

/// Resolve `name`, falling back to the host zone when it cannot be loaded.
pub fn load_zone(name: &str) -> Tz {
    match try_load_zone(name) {
        Ok(zone) => {
            debug!(zone = zone.name(), "server time zone loaded");
            zone
        }
        Err(err) => {
            let fallback = host_zone();
            warn!(
                requested = name,
                fallback = fallback.name(),
                error = %err,
                "cannot load server time zone, using host zone"
            );
            fallback
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Run `f` with a thread-local subscriber and return the `WARN`+ output.
    pub(crate) fn capture_warnings<R>(f: impl FnOnce() -> R) -> (R, String) {
        let sink = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(sink.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        let logs = String::from_utf8_lossy(&sink.0.lock().unwrap()).into_owned();
        (result, logs)
    }

    pub(crate) const FALLBACK_WARNING: &str = "cannot load server time zone";

    #[test]
    fn loads_named_zones() {
        assert_eq!(try_load_zone("Asia/Shanghai"), Ok(Tz::Asia__Shanghai));
        assert_eq!(try_load_zone("Hongkong"), Ok(Tz::Hongkong));
        assert_eq!(try_load_zone(" UTC "), Ok(Tz::UTC));
    }

    #[test]
    fn unknown_zone_is_an_error_in_strict_lookup() {
        assert_eq!(
            try_load_zone("Mars/Olympus_Mons"),
            Err(ZoneError::Unknown("Mars/Olympus_Mons".into()))
        );
    }

    #[test]
    fn unknown_zone_falls_back_to_host() {
        assert_eq!(load_zone("Mars/Olympus_Mons"), host_zone());
    }

    #[test]
    fn unknown_zone_warns_once() {
        let (zone, logs) = capture_warnings(|| load_zone("Mars/Olympus_Mons"));
        assert_eq!(zone, host_zone());
        assert_eq!(logs.matches(FALLBACK_WARNING).count(), 1, "{logs}");
        assert!(logs.contains("Mars/Olympus_Mons"), "{logs}");
    }

    #[test]
    fn known_zone_does_not_warn() {
        let (zone, logs) = capture_warnings(|| load_zone("Hongkong"));
        assert_eq!(zone, Tz::Hongkong);
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn default_zone_name_resolves() {
        assert_eq!(load_zone(DEFAULT_ZONE_NAME), Tz::Asia__Shanghai);
    }
}

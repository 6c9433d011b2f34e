//! Runtime configuration.
//!
//! Read from the environment once and cached:
//! - `REHOST_LOG`: `off` (default) or a level name (`trace`, `debug`,
//!   `info`, `warn`, `error`, `fatal`). Entries below the level are dropped.
//! - `REHOST_LOG_FILE`: path for the JSONL log. Defaults to stderr.
//!
//! [`set_log_threshold`] overrides the environment for tests and embedders.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::log::LogLevel;

// Atomic cache: 0=unresolved, 1=off, 2..=7 a level, 255=resolving.
// A caller that races the first resolution sees logging as off instead
// of blocking on the environment read.
static CACHED_THRESHOLD: AtomicU8 = AtomicU8::new(0);

const THRESHOLD_UNRESOLVED: u8 = 0;
const THRESHOLD_OFF: u8 = 1;
const THRESHOLD_RESOLVING: u8 = 255;

fn threshold_to_u8(level: Option<LogLevel>) -> u8 {
    match level {
        None => THRESHOLD_OFF,
        Some(LogLevel::Trace) => 2,
        Some(LogLevel::Debug) => 3,
        Some(LogLevel::Info) => 4,
        Some(LogLevel::Warn) => 5,
        Some(LogLevel::Error) => 6,
        Some(LogLevel::Fatal) => 7,
    }
}

fn u8_to_threshold(v: u8) -> Option<LogLevel> {
    match v {
        2 => Some(LogLevel::Trace),
        3 => Some(LogLevel::Debug),
        4 => Some(LogLevel::Info),
        5 => Some(LogLevel::Warn),
        6 => Some(LogLevel::Error),
        7 => Some(LogLevel::Fatal),
        _ => None,
    }
}

/// Parse a `REHOST_LOG` value. Unknown values disable logging.
#[must_use]
pub fn parse_log_env(raw: &str) -> Option<LogLevel> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "off" | "none" | "false" => None,
        "1" | "on" | "true" => Some(LogLevel::Info),
        other => LogLevel::from_str_loose(other),
    }
}

/// The minimum level that gets written, or `None` when logging is off.
#[must_use]
pub fn log_threshold() -> Option<LogLevel> {
    let cached = CACHED_THRESHOLD.load(Ordering::Relaxed);
    if cached != THRESHOLD_UNRESOLVED && cached != THRESHOLD_RESOLVING {
        return u8_to_threshold(cached);
    }
    if cached == THRESHOLD_RESOLVING {
        return None;
    }
    if CACHED_THRESHOLD
        .compare_exchange(
            THRESHOLD_UNRESOLVED,
            THRESHOLD_RESOLVING,
            Ordering::SeqCst,
            Ordering::Relaxed,
        )
        .is_err()
    {
        return u8_to_threshold(CACHED_THRESHOLD.load(Ordering::Relaxed));
    }

    let level = std::env::var("REHOST_LOG")
        .ok()
        .and_then(|v| parse_log_env(&v));
    // A concurrent override wins over the environment.
    let _ = CACHED_THRESHOLD.compare_exchange(
        THRESHOLD_RESOLVING,
        threshold_to_u8(level),
        Ordering::Release,
        Ordering::Relaxed,
    );
    u8_to_threshold(CACHED_THRESHOLD.load(Ordering::Relaxed))
}

/// Override the threshold. `None` turns logging off.
pub fn set_log_threshold(level: Option<LogLevel>) {
    CACHED_THRESHOLD.store(threshold_to_u8(level), Ordering::Release);
}

/// Destination file for runtime logs, if configured.
#[must_use]
pub fn log_file() -> Option<&'static Path> {
    static LOG_FILE: OnceLock<Option<PathBuf>> = OnceLock::new();
    LOG_FILE
        .get_or_init(|| {
            std::env::var_os("REHOST_LOG_FILE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        })
        .as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_log_values() {
        assert_eq!(parse_log_env("off"), None);
        assert_eq!(parse_log_env(""), None);
        assert_eq!(parse_log_env("OFF"), None);
        assert_eq!(parse_log_env("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_env(" Warn "), Some(LogLevel::Warn));
        assert_eq!(parse_log_env("on"), Some(LogLevel::Info));
        assert_eq!(parse_log_env("bogus"), None);
    }

    #[test]
    fn threshold_round_trips_through_cache_encoding() {
        for level in [
            None,
            Some(LogLevel::Trace),
            Some(LogLevel::Debug),
            Some(LogLevel::Info),
            Some(LogLevel::Warn),
            Some(LogLevel::Error),
            Some(LogLevel::Fatal),
        ] {
            assert_eq!(u8_to_threshold(threshold_to_u8(level)), level);
        }
    }

    #[test]
    fn override_takes_effect() {
        set_log_threshold(Some(LogLevel::Error));
        assert_eq!(log_threshold(), Some(LogLevel::Error));
        set_log_threshold(None);
        assert_eq!(log_threshold(), None);
    }
}

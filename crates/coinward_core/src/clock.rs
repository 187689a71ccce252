//! # Wall Clock
//!
//! The single place the engine reads real time. Every stateful component
//! takes `now_ms` as a parameter so tests can drive time explicitly; the
//! public convenience wrappers call this helper.

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
///
/// A clock set before the epoch reads as zero rather than panicking.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_monotonic_enough() {
        let a = now_millis();
        let b = now_millis();
        assert!(b >= a);
        // Well past 2020-01-01 in milliseconds.
        assert!(a > 1_577_836_800_000);
    }
}

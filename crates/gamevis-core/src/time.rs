//! Timestamps and clocks
//!
//! Every published marker is stamped with the registry's clock. The clock is
//! injected so tests can drive time by hand.

use std::ops::Add;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Message timestamp
/// Represented as microseconds since the Unix epoch
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Stamp(pub i64);

impl Stamp {
    pub const ZERO: Stamp = Stamp(0);

    #[inline]
    pub fn from_micros(micros: i64) -> Self {
        Stamp(micros)
    }

    #[inline]
    pub fn from_millis(millis: i64) -> Self {
        Stamp(millis * 1000)
    }

    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        Stamp((secs * 1_000_000.0) as i64)
    }

    #[inline]
    pub fn as_micros(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        Stamp(self.0.saturating_add(duration.as_micros() as i64))
    }
}

impl Add<Duration> for Stamp {
    type Output = Stamp;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl std::fmt::Debug for Stamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Stamp({:.6}s)", self.as_secs_f64())
    }
}

/// Source of "now" for stamping outgoing messages
pub trait Clock: Send + Sync {
    fn now(&self) -> Stamp;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Stamp {
        // A clock set before 1970 reads as the epoch
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO);
        Stamp(since_epoch.as_micros() as i64)
    }
}

/// Hand-driven clock for deterministic tests and replays
#[derive(Debug, Default)]
pub struct ManualClock {
    value: Mutex<Stamp>,
}

impl ManualClock {
    pub fn new(start: Stamp) -> Self {
        ManualClock {
            value: Mutex::new(start),
        }
    }

    pub fn set(&self, stamp: Stamp) {
        *self.value.lock() = stamp;
    }

    /// Move the clock forward, returning the new time
    pub fn advance(&self, dt: Duration) -> Stamp {
        let mut value = self.value.lock();
        *value = value.saturating_add(dt);
        *value
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Stamp {
        *self.value.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_after_epoch() {
        let clock = SystemClock;
        // 2020-01-01
        assert!(clock.now() > Stamp::from_secs_f64(1_577_836_800.0));
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new(Stamp::from_millis(1000));
        assert_eq!(clock.now(), Stamp::from_millis(1000));

        let t = clock.advance(Duration::from_millis(250));
        assert_eq!(t, Stamp::from_millis(1250));
        assert_eq!(clock.now().as_micros(), 1_250_000);

        clock.set(Stamp::ZERO);
        assert_eq!(clock.now(), Stamp::ZERO);
    }

    #[test]
    fn test_stamp_seconds() {
        let s = Stamp::from_secs_f64(1.5);
        assert_eq!(s.as_micros(), 1_500_000);
        assert!((s.as_secs_f64() - 1.5).abs() < 1e-9);
    }
}

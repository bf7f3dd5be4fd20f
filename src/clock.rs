//! Monotonic time sources.
//!
//! Timers never read wall-clock time. Everything downstream works on
//! [`Instant`] readings taken from a [`MonotonicClock`], and derives durations by
//! subtracting two readings.

use std::cell::Cell;
use std::ops::{Add, Sub};
use std::rc::Rc;
use std::time::Duration;

/// Opaque monotonic timestamp: an offset from the clock's own origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(Duration);

impl Instant {
    pub const ORIGIN: Instant = Instant(Duration::ZERO);

    pub fn from_millis(ms: u64) -> Self {
        Instant(Duration::from_millis(ms))
    }

    /// Build a reading from fractional milliseconds (the unit `performance.now()` uses).
    /// Negative and non-finite values collapse to the origin.
    pub fn from_millis_f64(ms: f64) -> Self {
        if ms.is_finite() && ms > 0.0 {
            Instant(Duration::from_secs_f64(ms / 1000.0))
        } else {
            Instant::ORIGIN
        }
    }

    /// Time elapsed from `earlier` to `self`, zero if `earlier` is later.
    pub fn saturating_duration_since(self, earlier: Instant) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        Instant(self.0 + rhs)
    }
}

impl Sub for Instant {
    type Output = Duration;

    fn sub(self, rhs: Instant) -> Duration {
        self.saturating_duration_since(rhs)
    }
}

/// A source of monotonically non-decreasing [`Instant`]s.
pub trait MonotonicClock {
    fn now(&self) -> Instant;
}

impl<C: MonotonicClock + ?Sized> MonotonicClock for Rc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Clock driven by hand. Clones share the same reading, so a test can keep one
/// handle and give another to the code under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    current: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.current.set(self.current.get() + by);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Move to an absolute reading. Readings behind the current one are ignored.
    pub fn set(&self, to: Instant) {
        if to > self.current.get() {
            self.current.set(to);
        }
    }
}

impl MonotonicClock for ManualClock {
    fn now(&self) -> Instant {
        self.current.get()
    }
}

/// Native clock backed by `std::time::Instant`, for running the timers outside the browser.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl MonotonicClock for SystemClock {
    fn now(&self) -> Instant {
        Instant(self.origin.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_the_reading() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance_ms(250);
        assert_eq!(clock.now(), Instant::from_millis(250));
    }

    #[test]
    fn manual_clock_never_goes_backwards() {
        let clock = ManualClock::new();
        clock.set(Instant::from_millis(1_000));
        clock.set(Instant::from_millis(400));
        assert_eq!(clock.now(), Instant::from_millis(1_000));
    }

    #[test]
    fn subtraction_saturates() {
        let early = Instant::from_millis(10);
        let late = Instant::from_millis(30);
        assert_eq!(late - early, Duration::from_millis(20));
        assert_eq!(early - late, Duration::ZERO);
    }

    #[test]
    fn fractional_millis_are_kept() {
        let t = Instant::from_millis_f64(1_234.5);
        let since_origin = t - Instant::ORIGIN;
        assert_eq!(since_origin.as_millis(), 1_234);
        assert!(since_origin > Duration::from_millis(1_234));
        assert_eq!(Instant::from_millis_f64(-3.0), Instant::ORIGIN);
        assert_eq!(Instant::from_millis_f64(f64::NAN), Instant::ORIGIN);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}

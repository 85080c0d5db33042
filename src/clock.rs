//! Core clock frequency (`SystemCoreClock`).
//!
//! The frequency is published exactly once, during boot, from the value the
//! clock-tree routine reports. Everything after that reads it through
//! [`system_core_clock`] or through the [`CoreClock`] handle returned by
//! [`setup`](crate::setup).
//!
//! Only atomic `load`/`store` are used so the cell works on ARMv6-M, which has
//! no compare-and-swap.

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Core clock frequency in Hz.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CoreClock(u32);

impl CoreClock {
    /// Wrap a frequency in Hz.
    pub const fn from_hz(hz: u32) -> Self {
        Self(hz)
    }

    /// Frequency in Hz
    pub const fn hz(&self) -> u32 {
        self.0
    }

    /// Core cycles per period of a `rate_hz` clock, rounded down.
    ///
    /// Returns 0 when `rate_hz` is 0.
    pub const fn cycles_per(&self, rate_hz: u32) -> u32 {
        match self.0.checked_div(rate_hz) {
            Some(cycles) => cycles,
            None => 0,
        }
    }
}

impl fmt::Display for CoreClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

/// Write-once cell holding the core clock.
#[derive(Debug)]
pub struct CoreClockCell {
    hz: AtomicU32,
    published: AtomicBool,
}

impl CoreClockCell {
    /// Create an empty (unpublished) cell.
    pub const fn new() -> Self {
        Self {
            hz: AtomicU32::new(0),
            published: AtomicBool::new(false),
        }
    }

    /// Publish the frequency.
    ///
    /// The first call wins. Later calls leave the value untouched and return
    /// `false`. Publication is only ever done by the boot sequence, which is
    /// single-threaded and runs once, so the check-then-store is not racy in
    /// practice.
    pub fn publish(&self, clock: CoreClock) -> bool {
        if self.published.load(Ordering::Acquire) {
            return false;
        }
        self.hz.store(clock.hz(), Ordering::Relaxed);
        self.published.store(true, Ordering::Release);
        true
    }

    /// Published frequency, or `None` before the clock tree is configured
    pub fn get(&self) -> Option<CoreClock> {
        if self.published.load(Ordering::Acquire) {
            Some(CoreClock(self.hz.load(Ordering::Relaxed)))
        } else {
            None
        }
    }

    /// Whether a frequency has been published
    pub fn is_published(&self) -> bool {
        self.published.load(Ordering::Acquire)
    }
}

impl Default for CoreClockCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide core clock, published by [`setup`](crate::setup).
pub static SYSTEM_CORE_CLOCK: CoreClockCell = CoreClockCell::new();

/// Current core clock, or `None` if boot has not configured the clock tree yet.
pub fn system_core_clock() -> Option<CoreClock> {
    SYSTEM_CORE_CLOCK.get()
}

//! Read side of the free-running time base.
//!
//! Once [`setup`](crate::setup) has started the counter it counts forever,
//! modulo its width. Two samples must always be compared with wrapping
//! subtraction masked to the counter width: the result is the true elapsed
//! tick count as long as the samples are less than one period apart.

use core::marker::PhantomData;

use embedded_hal::delay::DelayNs;

use crate::config::{BootConfig, DefaultConfig};
use crate::hal::CounterRead;

const NANOS_PER_SEC: u64 = 1_000_000_000;
const MICROS_PER_SEC: u64 = 1_000_000;

/// Wrap-safe elapsed ticks from `earlier` to `later`.
///
/// `counter_max` must be `2^width - 1`.
#[inline]
pub const fn elapsed_ticks(earlier: u32, later: u32, counter_max: u32) -> u32 {
    later.wrapping_sub(earlier) & counter_max
}

/// Shared, read-only view of the running time-base counter.
#[derive(Debug)]
pub struct TimeBase<R: CounterRead, C: BootConfig = DefaultConfig> {
    counter: R,
    _config: PhantomData<C>,
}

impl<R: CounterRead, C: BootConfig> TimeBase<R, C> {
    /// Wrap a counter that [`setup`](crate::setup) has already started.
    pub fn new(counter: R) -> Self {
        Self {
            counter,
            _config: PhantomData,
        }
    }

    /// Current counter value
    #[inline]
    pub fn now(&self) -> u32 {
        self.counter.read_counter() & C::COUNTER_MAX
    }

    /// Ticks elapsed since `earlier`, a previous [`now`](Self::now) sample.
    #[inline]
    pub fn elapsed_since(&self, earlier: u32) -> u32 {
        elapsed_ticks(earlier, self.now(), C::COUNTER_MAX)
    }

    /// Ticks in one full counter period
    pub const fn period_ticks() -> u64 {
        C::COUNTER_MAX as u64 + 1
    }

    /// Convert ticks to microseconds, rounding down.
    pub const fn ticks_to_micros(ticks: u64) -> u64 {
        ticks.saturating_mul(MICROS_PER_SEC) / C::TICK_HZ as u64
    }

    /// Convert microseconds to ticks, rounding up.
    pub const fn micros_to_ticks(us: u64) -> u64 {
        us.saturating_mul(C::TICK_HZ as u64).div_ceil(MICROS_PER_SEC)
    }

    /// Convert nanoseconds to ticks, rounding up.
    pub const fn nanos_to_ticks(ns: u64) -> u64 {
        ns.saturating_mul(C::TICK_HZ as u64).div_ceil(NANOS_PER_SEC)
    }

    /// Busy-wait for at least `ticks` counter ticks.
    ///
    /// The first sample may land just before an edge, so each chunk waits for
    /// one edge more than it counts. Waits longer than half a period are split
    /// so that no single comparison spans a wrap.
    pub fn wait_ticks(&mut self, ticks: u64) {
        let chunk = Self::period_ticks() / 2;
        let mut remaining = ticks;

        while remaining > 0 {
            let step = remaining.min(chunk) as u32;
            let start = self.now();
            while self.elapsed_since(start) <= step {
                core::hint::spin_loop();
            }
            remaining -= u64::from(step);
        }
    }

    /// Release the underlying counter.
    pub fn free(self) -> R {
        self.counter
    }
}

impl<R: CounterRead, C: BootConfig> DelayNs for TimeBase<R, C> {
    fn delay_ns(&mut self, ns: u32) {
        self.wait_ticks(Self::nanos_to_ticks(u64::from(ns)));
    }

    fn delay_us(&mut self, us: u32) {
        self.wait_ticks(Self::micros_to_ticks(u64::from(us)));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.wait_ticks(Self::micros_to_ticks(u64::from(ms) * 1_000));
    }
}

//! Calibrated busy-wait for clock-domain synchronization.
//!
//! The time-base counter runs from the 32.768 kHz oscillator, asynchronously
//! to the bus clock. A register write into that domain is only visible after
//! enough slow clock edges, and the number of core cycles per slow edge grows
//! with the core frequency. The wait budget is therefore
//! `core_hz >> SLOW_CLOCK_SHIFT` turns of a decrement-and-branch loop.
//!
//! The loop never runs fewer than [`MIN_SPIN_ITERATIONS`] turns, even for a
//! zero budget.

/// Floor on the number of loop turns, whatever the budget
pub const MIN_SPIN_ITERATIONS: u32 = 2;

/// Core cycles one decrement-and-branch turn is guaranteed to take (lower bound)
pub const CYCLES_PER_ITERATION: u32 = 2;

/// Raw wait budget: core cycles per slow clock edge.
///
/// A shift of 32 or more yields 0.
pub const fn sync_budget(core_hz: u32, slow_clock_shift: u32) -> u32 {
    match core_hz.checked_shr(slow_clock_shift) {
        Some(budget) => budget,
        None => 0,
    }
}

/// Number of loop turns the synchronization wait executes.
///
/// `max(sync_budget, MIN_SPIN_ITERATIONS)`; monotonically non-decreasing in
/// `core_hz`.
pub const fn sync_iterations(core_hz: u32, slow_clock_shift: u32) -> u32 {
    let budget = sync_budget(core_hz, slow_clock_shift);
    if budget < MIN_SPIN_ITERATIONS {
        MIN_SPIN_ITERATIONS
    } else {
        budget
    }
}

/// Cycle-deterministic delay primitive.
///
/// Contract: `spin(n)` blocks for at least `n` decrement-and-branch turns,
/// i.e. at least `n * CYCLES_PER_ITERATION` core cycles. It must not yield,
/// sleep or depend on any timer.
pub trait SpinDelay {
    /// Busy-wait for at least `iterations` loop turns.
    fn spin(&mut self, iterations: u32);
}

/// Spin loop executed by the core itself.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct CycleSpin;

impl SpinDelay for CycleSpin {
    #[cfg(all(target_arch = "arm", target_os = "none"))]
    #[inline]
    fn spin(&mut self, iterations: u32) {
        let iterations = iterations.max(MIN_SPIN_ITERATIONS);
        cortex_m::asm::delay(iterations.saturating_mul(CYCLES_PER_ITERATION));
    }

    #[cfg(not(all(target_arch = "arm", target_os = "none")))]
    #[inline]
    fn spin(&mut self, iterations: u32) {
        for _ in 0..iterations.max(MIN_SPIN_ITERATIONS) {
            core::hint::spin_loop();
        }
    }
}

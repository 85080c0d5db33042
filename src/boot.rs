//! Boot sequencer.
//!
//! Brings the chip from reset to a running time base. The order is fixed:
//!
//! 1. open the SYSCFG and PWR clock gates
//! 2. set the SysTick priority
//! 3. configure the clock tree and publish the core clock
//! 4. initialize and power on the time-base counter (not started)
//! 5. spin until the 32 kHz domain has caught up with the bus clock
//! 6. set auto-reload to the counter maximum
//! 7. start the counter in continuous mode
//!
//! Skipping or reordering steps 4-7 leaves a counter that free-runs with a
//! wrong or glitched reload value, and nothing reports it.
//!
//! Nothing here is checked or retried. A broken clock tree still boots, with a
//! wrong time base; boot must not deadlock where no diagnostics exist yet.

use core::marker::PhantomData;

use log::{debug, trace, warn};

use crate::clock::{CoreClock, CoreClockCell, SYSTEM_CORE_CLOCK};
use crate::config::{BootConfig, DefaultConfig, encode_priority};
use crate::error::BootError;
use crate::hal::BootHal;
use crate::spin::sync_iterations;

/// Runs the boot sequence against a platform.
///
/// Not idempotent: run it exactly once per reset.
#[derive(Debug)]
pub struct Sequencer<'a, H: BootHal, C: BootConfig = DefaultConfig> {
    hal: &'a mut H,
    _config: PhantomData<C>,
}

impl<'a, H: BootHal, C: BootConfig> Sequencer<'a, H, C> {
    /// Create a sequencer borrowing the platform for the duration of boot.
    pub fn new(hal: &'a mut H) -> Self {
        Self {
            hal,
            _config: PhantomData,
        }
    }

    /// Run every boot step, publishing the core clock into `core_clock`.
    ///
    /// Always returns `Ok` with the published core clock. The error arm is
    /// reserved; see [`BootError`].
    pub fn run(self, core_clock: &CoreClockCell) -> Result<CoreClock, BootError> {
        // The clock tree routine touches PWR, so the gates go first.
        for gate in C::BOOT_GATES {
            trace!(target: "tickboot::boot", "enable clock gate {:?} bit {}", gate.bus(), gate.bit());
            self.hal.enable_clock(*gate);
        }

        let priority = encode_priority(C::TICK_PRIORITY, C::PRIORITY_BITS);
        trace!(target: "tickboot::boot", "systick priority {} (0x{:02x})", C::TICK_PRIORITY, priority);
        self.hal.set_tick_priority(priority);

        let reported = CoreClock::from_hz(self.hal.configure_clock_tree());
        if !core_clock.publish(reported) {
            warn!(target: "tickboot::boot", "core clock already published, keeping first value");
        }
        let clock = core_clock.get().unwrap_or(reported);
        debug!(target: "tickboot::boot", "core clock {}", clock);

        trace!(target: "tickboot::boot", "init time base");
        self.hal.init_time_base();
        self.hal.enable_time_base();

        let iterations = sync_iterations(clock.hz(), C::SLOW_CLOCK_SHIFT);
        debug!(target: "tickboot::boot", "slow domain sync: {} spin iterations", iterations);
        self.hal.spin(iterations);

        trace!(target: "tickboot::boot", "auto-reload 0x{:x}, start continuous", C::COUNTER_MAX);
        self.hal.set_auto_reload(C::COUNTER_MAX);
        self.hal.start_continuous();

        Ok(clock)
    }
}

/// Boot entry point with the default STM32L0 configuration.
///
/// Publishes the process-wide core clock (see
/// [`system_core_clock`](crate::clock::system_core_clock)). Call once, from
/// startup code, before any other application code.
///
/// ```rust,ignore
/// let _ = tickboot::setup(&mut board);
/// ```
pub fn setup<H: BootHal>(hal: &mut H) -> Result<CoreClock, BootError> {
    setup_with::<H, DefaultConfig>(hal)
}

/// Boot entry point with an explicit configuration.
pub fn setup_with<H: BootHal, C: BootConfig>(hal: &mut H) -> Result<CoreClock, BootError> {
    Sequencer::<H, C>::new(hal).run(&SYSTEM_CORE_CLOCK)
}

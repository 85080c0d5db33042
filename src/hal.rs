//! Platform abstraction for the boot sequence and fault sink.
//!
//! The vendor register layer is consumed through these traits. A board crate
//! implements them once for its chip; host tests implement them with mocks
//! that record every call.

use crate::fault::FaultRecord;
use crate::spin::SpinDelay;

/// Bus whose enable register holds a peripheral clock gate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Bus {
    /// AHB peripherals (`RCC_AHBENR`)
    Ahb,
    /// APB1 peripherals (`RCC_APB1ENR`)
    Apb1,
    /// APB2 peripherals (`RCC_APB2ENR`)
    Apb2,
    /// GPIO ports (`RCC_IOPENR`)
    Iop,
}

/// One peripheral clock gate: a bit in a bus enable register.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ClockGate {
    bus: Bus,
    bit: u8,
}

impl ClockGate {
    /// Create a gate descriptor. `bit` must be in `0..=31`.
    pub const fn new(bus: Bus, bit: u8) -> Self {
        Self { bus, bit }
    }

    /// Bus enable register holding this gate
    pub const fn bus(&self) -> Bus {
        self.bus
    }

    /// Bit position in the enable register
    pub const fn bit(&self) -> u8 {
        self.bit
    }

    /// Single-bit mask for read-modify-write of the enable register
    pub const fn mask(&self) -> u32 {
        1u32 << (self.bit & 31)
    }
}

/// Peripheral enums that know their own clock gate.
///
/// Usually derived with `#[derive(PeripheralGate)]`:
///
/// ```rust,ignore
/// use tickboot::PeripheralGate;
///
/// #[derive(Copy, Clone, PeripheralGate)]
/// pub enum L0Peripheral {
///     #[gate(apb2, bit = 0)]
///     Syscfg,
///     #[gate(apb1, bit = 31)]
///     Lptim1,
/// }
/// ```
pub trait PeripheralGate {
    /// Clock gate descriptor for this peripheral
    fn gate(&self) -> ClockGate;

    /// Peripheral name (variant name when derived)
    fn name(&self) -> &'static str;
}

/// Boot-time collaborators provided by the platform.
///
/// Called by the [`Sequencer`](crate::boot::Sequencer) in a fixed order. None
/// of these report errors: a misbehaving collaborator cannot be detected at
/// this stage.
pub trait BootHal: SpinDelay {
    /// Open a peripheral clock gate.
    fn enable_clock(&mut self, gate: ClockGate);

    /// Write the SysTick priority byte (already encoded for the NVIC).
    fn set_tick_priority(&mut self, priority: u8);

    /// Configure the full clock tree and return the resulting core clock in Hz.
    fn configure_clock_tree(&mut self) -> u32;

    /// Configure time-base prescaler and clock source. Does not power it on.
    fn init_time_base(&mut self);

    /// Power on the time-base counter without starting it.
    fn enable_time_base(&mut self);

    /// Write the counter auto-reload (wrap) value.
    fn set_auto_reload(&mut self, value: u32);

    /// Start the counter in continuous mode.
    fn start_continuous(&mut self);
}

/// Read access to the running time-base counter.
pub trait CounterRead {
    /// Sample the current counter value.
    fn read_counter(&self) -> u32;
}

impl<R: CounterRead + ?Sized> CounterRead for &R {
    fn read_counter(&self) -> u32 {
        (**self).read_counter()
    }
}

/// Terminal-state hooks used by the fault sink.
pub trait FaultPlatform {
    /// Mask all maskable interrupts, globally.
    fn disable_interrupts(&mut self);

    /// Hand the fault record to a diagnostic sink.
    ///
    /// Called with interrupts already masked. The default does nothing.
    fn report(&mut self, _record: &FaultRecord<'_>) {}

    /// One turn of the halt loop.
    fn idle(&mut self);
}

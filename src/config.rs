//! Configuration traits and implementations for the boot sequence.
//!
//! The `BootConfig` trait fixes target constants (slow clock rate, tick
//! priority, counter width, boot-time clock gates) at compile time without
//! runtime overhead.

use crate::hal::{Bus, ClockGate};

/// Boot configuration trait defining target constants.
///
/// All values are const (zero runtime cost).
pub trait BootConfig {
    /// log2 of the slow oscillator frequency (32.768 kHz = 2^15)
    const SLOW_CLOCK_SHIFT: u32;

    /// Logical SysTick priority level (0 = most urgent)
    const TICK_PRIORITY: u8;

    /// Number of implemented NVIC priority bits
    const PRIORITY_BITS: u8;

    /// Width of the time-base counter in bits
    const COUNTER_BITS: u32;

    /// Counter maximum, used as auto-reload value (free-running)
    const COUNTER_MAX: u32 = if Self::COUNTER_BITS >= 32 {
        u32::MAX
    } else {
        (1u32 << Self::COUNTER_BITS) - 1
    };

    /// Counter input rate after prescaling
    const TICK_HZ: u32;

    /// Clock gates that must be open before the clock tree can be configured
    const BOOT_GATES: &'static [ClockGate];
}

/// SYSCFG clock gate on STM32L0 (`RCC_APB2ENR.SYSCFGEN`)
pub const SYSCFG_GATE: ClockGate = ClockGate::new(Bus::Apb2, 0);

/// PWR clock gate on STM32L0 (`RCC_APB1ENR.PWREN`)
pub const PWR_GATE: ClockGate = ClockGate::new(Bus::Apb1, 28);

/// Default configuration for STM32L0 with LPTIM1 as time base.
///
/// - SLOW_CLOCK_SHIFT: 15 (LSE, 32.768 kHz)
/// - TICK_PRIORITY: 3, encoded in 2 priority bits
/// - COUNTER_BITS: 16 (auto-reload 0xFFFF)
/// - TICK_HZ: 32768 (prescaler 1, wraps every 2 s)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DefaultConfig;

impl BootConfig for DefaultConfig {
    const SLOW_CLOCK_SHIFT: u32 = 15;
    const TICK_PRIORITY: u8 = 3;
    const PRIORITY_BITS: u8 = 2;
    const COUNTER_BITS: u32 = 16;
    const TICK_HZ: u32 = 32_768;
    const BOOT_GATES: &'static [ClockGate] = &[SYSCFG_GATE, PWR_GATE];
}

/// LPTIM1 with prescaler 32.
///
/// Same synchronization and gates as [`DefaultConfig`], but the counter runs
/// at 1024 Hz so it wraps every 64 s instead of every 2 s.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PrescaledConfig;

impl BootConfig for PrescaledConfig {
    const SLOW_CLOCK_SHIFT: u32 = 15;
    const TICK_PRIORITY: u8 = 3;
    const PRIORITY_BITS: u8 = 2;
    const COUNTER_BITS: u32 = 16;
    const TICK_HZ: u32 = 1_024;
    const BOOT_GATES: &'static [ClockGate] = &[SYSCFG_GATE, PWR_GATE];
}

/// Encode a logical priority level into the NVIC priority byte.
///
/// Only the top `prio_bits` bits are implemented in hardware, so the level is
/// shifted up into them. Levels that do not fit are clamped to the lowest
/// urgency the target supports.
pub const fn encode_priority(level: u8, prio_bits: u8) -> u8 {
    if prio_bits == 0 {
        return 0;
    }
    let bits = if prio_bits > 8 { 8 } else { prio_bits };
    let max_level = ((1u16 << bits) - 1) as u8;
    let level = if level > max_level { max_level } else { level };
    ((level as u16) << (8 - bits)) as u8
}

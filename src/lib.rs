//! # tickboot
//!
//! Earliest-boot layer for Cortex-M microcontrollers with a low-power timer as
//! system time base.
//!
//! **Key pieces:**
//! - **Boot sequencer** - clock gates, tick priority, clock tree, then a
//!   calibrated wait for the 32 kHz domain before the counter is armed
//! - **Core clock** - write-once `SystemCoreClock`, readable from anywhere
//! - **Time base** - wrap-safe tick arithmetic and an `embedded-hal` delay
//! - **Fault sink** - masks interrupts and parks the core, never returns
//!
//! The vendor register layer is reached through the [`BootHal`],
//! [`CounterRead`] and [`FaultPlatform`] traits, so the sequence itself runs
//! (and is tested) on the host.
//!
//! ## Optional Features
//!
//! - `panic-handler` - route Rust panics into the fault sink
//! - `hardfault` - forward the stacked PC/xPSR of a HardFault to the fault sink
//!
//! The library provides a `#[derive(PeripheralGate)]` macro that's always available.
//!
//! This library is `no_std` compatible.

#![no_std]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

extern crate heapless;

// Re-export derive macro (always available)
pub use tickboot_macros::PeripheralGate;

// ============================================================================
// Module Declarations
// ============================================================================

pub mod config;
pub mod error;
pub mod hal;

pub mod clock;
pub mod spin;

pub mod boot;
pub mod timebase;

pub mod fault;

// ============================================================================
// Re-exports - Public API
// ============================================================================

// Platform traits
pub use hal::{BootHal, Bus, ClockGate, CounterRead, FaultPlatform, PeripheralGate};

// Configuration
pub use config::{BootConfig, DefaultConfig, PrescaledConfig};

// Error types
pub use error::{BootError, status_code};

// Core clock
pub use clock::{CoreClock, CoreClockCell, system_core_clock};

// Calibrated wait
pub use spin::{CycleSpin, SpinDelay};

// Boot sequencer
pub use boot::{Sequencer, setup, setup_with};

// Time base
pub use timebase::TimeBase;

// Fault sink
pub use fault::{FaultRecord, halt};

#[cfg(all(target_arch = "arm", target_os = "none"))]
pub use fault::{CortexMFault, panic_impl};

// ============================================================================
// Library Metadata
// ============================================================================

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

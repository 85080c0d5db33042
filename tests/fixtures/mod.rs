//! Test fixtures and utilities for tickboot testing.
//!
//! Provides:
//! - `MockHal`: BootHal that records every call in order and simulates the counter
//! - `MockFault`: FaultPlatform whose halt loop unwinds after a bounded number of turns
//! - `MockCounter`: free-running counter advanced by hand
//! - `MockPeripheral`: peripheral enum using the derive macro

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::string::{String, ToString};

use tickboot::clock::CoreClockCell;
use tickboot::hal::{BootHal, ClockGate, CounterRead, FaultPlatform};
use tickboot::spin::SpinDelay;
use tickboot::{FaultRecord, PeripheralGate};

// ============================================================================
// MockHal - Boot Platform
// ============================================================================

/// One call into the boot platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    EnableClock(ClockGate),
    TickPriority(u8),
    ClockTree(u32),
    InitTimeBase,
    EnableTimeBase,
    Spin(u32),
    AutoReload(u32),
    Start,
}

/// Mock boot platform.
///
/// The clock tree "configures" to `core_hz`. The simulated counter only
/// counts once it has been powered, given a reload value and started; every
/// read then advances it by one tick, wrapping at the reload value.
///
/// When built with [`MockHal::watching`], the sync wait also records whether
/// the watched clock cell was already published at that moment.
#[derive(Debug)]
pub struct MockHal {
    pub core_hz: u32,
    pub events: Vec<Event>,
    pub published_at_spin: Option<bool>,
    watched: Option<Rc<CoreClockCell>>,
    enabled: bool,
    reload: Option<u32>,
    running: bool,
    counter: Cell<u32>,
}

impl MockHal {
    pub fn new(core_hz: u32) -> Self {
        Self {
            core_hz,
            events: Vec::new(),
            published_at_spin: None,
            watched: None,
            enabled: false,
            reload: None,
            running: false,
            counter: Cell::new(0),
        }
    }

    /// Mock that checks `cell` when the sync wait starts.
    pub fn watching(core_hz: u32, cell: Rc<CoreClockCell>) -> Self {
        Self {
            watched: Some(cell),
            ..Self::new(core_hz)
        }
    }

    /// Position of the first event matching `pred`.
    pub fn position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
        self.events.iter().position(pred)
    }

    /// Number of events matching `pred`.
    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    /// Spin iterations issued, if the wait happened.
    pub fn spun(&self) -> Option<u32> {
        self.events.iter().find_map(|e| match e {
            Event::Spin(n) => Some(*n),
            _ => None,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl SpinDelay for MockHal {
    fn spin(&mut self, iterations: u32) {
        if let Some(cell) = &self.watched {
            self.published_at_spin = Some(cell.is_published());
        }
        self.events.push(Event::Spin(iterations));
    }
}

impl BootHal for MockHal {
    fn enable_clock(&mut self, gate: ClockGate) {
        self.events.push(Event::EnableClock(gate));
    }

    fn set_tick_priority(&mut self, priority: u8) {
        self.events.push(Event::TickPriority(priority));
    }

    fn configure_clock_tree(&mut self) -> u32 {
        self.events.push(Event::ClockTree(self.core_hz));
        self.core_hz
    }

    fn init_time_base(&mut self) {
        self.events.push(Event::InitTimeBase);
    }

    fn enable_time_base(&mut self) {
        self.enabled = true;
        self.events.push(Event::EnableTimeBase);
    }

    fn set_auto_reload(&mut self, value: u32) {
        self.reload = Some(value);
        self.events.push(Event::AutoReload(value));
    }

    fn start_continuous(&mut self) {
        self.running = self.enabled && self.reload.is_some();
        self.events.push(Event::Start);
    }
}

impl CounterRead for MockHal {
    fn read_counter(&self) -> u32 {
        let value = self.counter.get();
        if self.running {
            let next = if Some(value) == self.reload { 0 } else { value + 1 };
            self.counter.set(next);
        }
        value
    }
}

// ============================================================================
// MockFault - Fault Platform
// ============================================================================

/// One call into the fault platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultEvent {
    DisableInterrupts,
    Report,
    Idle,
}

/// Panic payload used to break out of the halt loop.
#[derive(Debug)]
pub struct IdleLimit;

/// Owned copy of a reported fault record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedFault {
    pub file: String,
    pub line: u32,
    pub message: String,
    pub pc: usize,
    pub sr: usize,
}

/// Mock fault platform.
///
/// After `idle_limit` turns of the halt loop, `idle` unwinds with an
/// [`IdleLimit`] payload so the test can observe that the sink was still
/// looping and had not returned.
#[derive(Debug)]
pub struct MockFault {
    pub events: Vec<FaultEvent>,
    pub interrupts_enabled: bool,
    pub in_interrupt: bool,
    pub reported: Option<ReportedFault>,
    pub idles: usize,
    idle_limit: usize,
}

impl MockFault {
    pub fn new(idle_limit: usize) -> Self {
        Self {
            events: Vec::new(),
            interrupts_enabled: true,
            in_interrupt: false,
            reported: None,
            idles: 0,
            idle_limit,
        }
    }
}

impl FaultPlatform for MockFault {
    fn disable_interrupts(&mut self) {
        self.interrupts_enabled = false;
        self.events.push(FaultEvent::DisableInterrupts);
    }

    fn report(&mut self, record: &FaultRecord<'_>) {
        self.reported = Some(ReportedFault {
            file: record.file.to_string(),
            line: record.line,
            message: record.message.to_string(),
            pc: record.pc,
            sr: record.sr,
        });
        self.events.push(FaultEvent::Report);
    }

    fn idle(&mut self) {
        self.idles += 1;
        if self.events.last() != Some(&FaultEvent::Idle) {
            self.events.push(FaultEvent::Idle);
        }
        if self.idles >= self.idle_limit {
            std::panic::panic_any(IdleLimit);
        }
    }
}

/// Fault platform that keeps the default (no-op) reporter.
#[derive(Debug, Default)]
pub struct SilentFault {
    pub disabled: bool,
    pub idles: usize,
}

impl FaultPlatform for SilentFault {
    fn disable_interrupts(&mut self) {
        self.disabled = true;
    }

    fn idle(&mut self) {
        self.idles += 1;
        if self.idles >= 8 {
            std::panic::panic_any(IdleLimit);
        }
    }
}

// ============================================================================
// MockCounter - Time Base
// ============================================================================

/// Counter that only moves when the test says so.
#[derive(Debug, Default)]
pub struct MockCounter {
    value: Cell<u32>,
}

impl MockCounter {
    pub fn starting_at(value: u32) -> Self {
        Self {
            value: Cell::new(value),
        }
    }

    /// Advance by `ticks`, wrapping at 16 bits.
    pub fn advance(&self, ticks: u32) {
        self.value.set(self.value.get().wrapping_add(ticks) & 0xFFFF);
    }
}

impl CounterRead for MockCounter {
    fn read_counter(&self) -> u32 {
        self.value.get()
    }
}

// ============================================================================
// MockPeripheral - Derived Clock Gates
// ============================================================================

/// STM32L0 peripherals touched during boot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PeripheralGate)]
pub enum MockPeripheral {
    #[gate(apb2, bit = 0)]
    Syscfg,
    #[gate(apb1, bit = 28)]
    Pwr,
    #[gate(apb1, bit = 31)]
    Lptim1,
    #[gate(iop, bit = 0)]
    GpioA,
    #[gate(ahb, bit = 8)]
    Mif,
}

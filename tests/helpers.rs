//! Shared test helpers to reduce duplication across integration tests.

#![allow(dead_code)]
#![allow(unused_imports)]

#[allow(clippy::duplicate_mod)]
#[path = "fixtures/mod.rs"]
mod fixtures;

use std::any::Any;
use std::rc::Rc;
use std::panic::{AssertUnwindSafe, catch_unwind};

pub use fixtures::{Event, FaultEvent, IdleLimit, MockCounter, MockFault, MockHal, MockPeripheral, SilentFault};

use tickboot::clock::CoreClockCell;
use tickboot::config::{BootConfig, DefaultConfig};
use tickboot::{CoreClock, Sequencer};

// ============================================================================
// Boot Helpers
// ============================================================================

/// Run the default boot sequence against a fresh mock and a private clock cell.
pub fn boot_mock(core_hz: u32) -> (MockHal, Rc<CoreClockCell>, CoreClock) {
    boot_mock_with::<DefaultConfig>(core_hz)
}

/// Run the boot sequence with an explicit configuration.
///
/// The mock watches the clock cell so it can tell whether the core clock was
/// published by the time the sync wait started.
pub fn boot_mock_with<C: BootConfig>(core_hz: u32) -> (MockHal, Rc<CoreClockCell>, CoreClock) {
    let cell = Rc::new(CoreClockCell::new());
    let mut hal = MockHal::watching(core_hz, Rc::clone(&cell));
    let clock = Sequencer::<_, C>::new(&mut hal)
        .run(&cell)
        .expect("boot sequence reports success");
    (hal, cell, clock)
}

// ============================================================================
// Fault Helpers
// ============================================================================

/// Run `f`, which is expected to enter the halt loop, and return the unwind payload.
///
/// Panics if `f` comes back normally.
pub fn expect_parked(f: impl FnOnce()) -> Box<dyn Any + Send> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => panic!("fault sink returned control to its caller"),
        Err(payload) => payload,
    }
}

/// Assert the payload came from the mock's idle bound, not from some other panic.
pub fn assert_idle_limit(payload: &(dyn Any + Send)) {
    assert!(
        payload.downcast_ref::<IdleLimit>().is_some(),
        "halt loop was left by an unexpected panic"
    );
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert that event `a` happened strictly before event `b`.
pub fn assert_before(hal: &MockHal, a: impl Fn(&Event) -> bool, b: impl Fn(&Event) -> bool, what: &str) {
    let pa = hal.position(a).unwrap_or_else(|| panic!("{}: first event missing", what));
    let pb = hal.position(b).unwrap_or_else(|| panic!("{}: second event missing", what));
    assert!(pa < pb, "{}: expected {} < {} in {:?}", what, pa, pb, hal.events);
}

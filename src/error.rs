//! Error types for the boot sequence.
//!
//! The boot sequence does not currently detect any failure. `BootError`
//! exists so the status contract has a failure arm that callers already
//! handle when detection is added.

use core::fmt;

/// Boot error type.
///
/// No variant is produced by the current sequence: clock misconfiguration and
/// unresponsive peripherals are not detected at this stage, and boot continues
/// with whatever time base it ends up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BootError {
    /// Reserved for a future failure report
    Reserved,
}

impl BootError {
    /// C-style integer status for this error (never `0`)
    pub const fn code(&self) -> i32 {
        match self {
            BootError::Reserved => -1,
        }
    }
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootError::Reserved => write!(f, "Boot failed"),
        }
    }
}

/// Map a boot result to the integer status startup code expects.
///
/// `0` is success; failures use [`BootError::code`].
pub fn status_code<T>(result: &Result<T, BootError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(err) => err.code(),
    }
}

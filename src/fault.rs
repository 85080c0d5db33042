//! Fatal fault sink.
//!
//! [`halt`] is the terminus of every unrecoverable error in the firmware. It
//! masks interrupts before doing anything else, hands the fault record to the
//! platform reporter, then parks the core forever. There is no recovery, reset
//! or retry path: resuming after a fault would act on corrupted state.
//!
//! Re-entry (from an interrupt, or a fault inside the reporter) is harmless.
//! Interrupts are already masked and every entry ends in the same loop.

use core::fmt::{self, Write};

use heapless::String;

use crate::hal::FaultPlatform;

/// Diagnostic context of a fatal fault. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultRecord<'a> {
    /// Source file that raised the fault
    pub file: &'a str,
    /// Source line
    pub line: u32,
    /// Human-readable message
    pub message: &'a str,
    /// Faulting program counter (0 when unknown)
    pub pc: usize,
    /// Faulting status/flags register (0 when unknown)
    pub sr: usize,
}

impl<'a> FaultRecord<'a> {
    /// Bundle fault context.
    pub const fn new(file: &'a str, line: u32, message: &'a str, pc: usize, sr: usize) -> Self {
        Self {
            file,
            line,
            message,
            pc,
            sr,
        }
    }

    /// Render the record into a fixed-capacity string, truncating if needed.
    ///
    /// Meant for reporters that have no allocator and a small UART buffer.
    pub fn summary<const N: usize>(&self) -> String<N> {
        let mut out = Truncating(String::new());
        // Truncating never fails
        let _ = write!(out, "{}", self);
        out.0
    }
}

impl fmt::Display for FaultRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} (pc=0x{:08x}, sr=0x{:08x})",
            self.file, self.line, self.message, self.pc, self.sr
        )
    }
}

/// `fmt::Write` adapter that drops whatever does not fit.
struct Truncating<const N: usize>(String<N>);

impl<const N: usize> Write for Truncating<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Enter the halted state. Never returns.
///
/// Order: interrupts are masked first, then the record goes to
/// [`FaultPlatform::report`], then [`FaultPlatform::idle`] runs forever.
/// `pc` and `sr` are not interpreted here; they only travel to the reporter.
pub fn halt<P: FaultPlatform>(
    platform: &mut P,
    file: &str,
    line: u32,
    message: &str,
    pc: usize,
    sr: usize,
) -> ! {
    platform.disable_interrupts();

    let record = FaultRecord::new(file, line, message, pc, sr);
    platform.report(&record);

    loop {
        platform.idle();
    }
}

/// Raise a fatal fault with the current source location.
///
/// With an explicit platform:
///
/// ```rust,ignore
/// tickboot::fault!(&mut platform, "dma underrun");
/// ```
///
/// On bare-metal Cortex-M the platform can be omitted and
/// [`panic_impl`](crate::panic_impl) is used.
#[macro_export]
macro_rules! fault {
    ($platform:expr, $msg:expr) => {
        $crate::fault::halt($platform, file!(), line!(), $msg, 0, 0)
    };
    ($msg:expr) => {
        $crate::panic_impl(file!(), line!(), $msg, 0, 0)
    };
}

/// Fault platform for Cortex-M cores.
#[cfg(all(target_arch = "arm", target_os = "none"))]
#[derive(Debug, Default, Copy, Clone)]
pub struct CortexMFault;

#[cfg(all(target_arch = "arm", target_os = "none"))]
impl FaultPlatform for CortexMFault {
    #[inline(always)]
    fn disable_interrupts(&mut self) {
        cortex_m::interrupt::disable();
    }

    #[inline(always)]
    fn idle(&mut self) {
        core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
    }
}

/// Fault sink entry point for Cortex-M firmware.
///
/// Callable from any context, including interrupt handlers.
#[cfg(all(target_arch = "arm", target_os = "none"))]
#[inline(never)]
pub fn panic_impl(file: &str, line: u32, message: &str, pc: usize, sr: usize) -> ! {
    halt(&mut CortexMFault, file, line, message, pc, sr)
}

#[cfg(all(feature = "panic-handler", target_arch = "arm", target_os = "none"))]
#[panic_handler]
fn on_panic(info: &core::panic::PanicInfo<'_>) -> ! {
    cortex_m::interrupt::disable();

    let (file, line) = info
        .location()
        .map(|loc| (loc.file(), loc.line()))
        .unwrap_or(("<unknown>", 0));
    let mut message = Truncating::<64>(String::new());
    // Truncating never fails
    let _ = write!(message, "{}", info.message());

    panic_impl(file, line, message.0.as_str(), 0, 0)
}

#[cfg(all(feature = "hardfault", target_arch = "arm", target_os = "none"))]
#[cortex_m_rt::exception]
unsafe fn HardFault(frame: &cortex_m_rt::ExceptionFrame) -> ! {
    panic_impl(
        "<hardfault>",
        0,
        "HardFault",
        frame.pc() as usize,
        frame.xpsr() as usize,
    )
}

//! STM32L011 (NUCLEO-L011K4) boot example
//!
//! Boots through tickboot, then blinks the user LED using the LPTIM1 time
//! base as delay source.
//!
//! # Hardware Setup
//! - Board: NUCLEO-L011K4
//! - Core clock: HSI16 (16 MHz)
//! - Time base: LPTIM1 clocked from the 32.768 kHz LSE
//! - LED: PB3 (User LED LD3)

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use embedded_hal::delay::DelayNs;
use stm32l0::stm32l0x1 as pac;

use stm32l011_demo::{Board, CORE_CLOCK_HZ, LedFault};
use tickboot::{DefaultConfig, TimeBase};

#[entry]
fn main() -> ! {
    let Some(dp) = pac::Peripherals::take() else {
        tickboot::fault!("device peripherals already taken");
    };
    let Some(cp) = cortex_m::Peripherals::take() else {
        tickboot::fault!("core peripherals already taken");
    };

    let mut board = Board::new(dp, cp);

    // Boot failures are not reported; the status is informational only
    let _ = tickboot::setup(&mut board);

    board.init_led();

    let mut time_base: TimeBase<_, DefaultConfig> = TimeBase::new(&board);

    // Boot does not verify the LSE; a counter that never moves is fatal here
    let start = time_base.now();
    cortex_m::asm::delay(CORE_CLOCK_HZ / 100);
    if time_base.elapsed_since(start) == 0 {
        tickboot::halt(&mut LedFault::new(&board), file!(), line!(), "LPTIM1 not counting", 0, 0);
    }

    let mut led_on = false;
    loop {
        led_on = !led_on;
        board.set_led(led_on);
        time_base.delay_ms(500);
    }
}

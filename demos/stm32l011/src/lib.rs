//! Board support for NUCLEO-L011K4
//!
//! Implements the tickboot platform traits on top of raw STM32L0x1 register
//! access: clock gates, HSI16 clock tree with LSE feeding LPTIM1, and LPTIM1
//! as the 16-bit free-running time base.

#![no_std]

use cortex_m::peripheral::scb::SystemHandler;
use stm32l0::stm32l0x1 as pac;

use tickboot::{
    BootHal, Bus, ClockGate, CounterRead, CycleSpin, FaultPlatform, FaultRecord, PeripheralGate,
    SpinDelay,
};

// =============================================================================
// Peripheral Clock Gates
// =============================================================================

/// Peripherals this board turns on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PeripheralGate)]
pub enum L0Peripheral {
    #[gate(apb2, bit = 0)]
    Syscfg,
    #[gate(apb1, bit = 28)]
    Pwr,
    #[gate(apb1, bit = 31)]
    Lptim1,
    #[gate(iop, bit = 1)]
    GpioB,
}

// =============================================================================
// Register Bits (RM0377)
// =============================================================================

const RCC_CR_HSI16ON: u32 = 1 << 0;
const RCC_CR_HSI16RDYF: u32 = 1 << 2;
const RCC_CFGR_SW_MASK: u32 = 0b11;
const RCC_CFGR_SW_HSI16: u32 = 0b01;
const RCC_CFGR_SWS_MASK: u32 = 0b11 << 2;
const RCC_CFGR_SWS_HSI16: u32 = 0b01 << 2;
const RCC_CSR_LSEON: u32 = 1 << 8;
const RCC_CSR_LSERDY: u32 = 1 << 9;
const RCC_CCIPR_LPTIM1SEL_MASK: u32 = 0b11 << 18;
const RCC_CCIPR_LPTIM1SEL_LSE: u32 = 0b11 << 18;
const PWR_CR_DBP: u32 = 1 << 8;
const FLASH_ACR_LATENCY: u32 = 1 << 0;
const LPTIM_CR_ENABLE: u32 = 1 << 0;
const LPTIM_CR_CNTSTRT: u32 = 1 << 2;
const LPTIM_CFGR_PRESC_MASK: u32 = 0b111 << 9;

/// HSI16 core clock
pub const CORE_CLOCK_HZ: u32 = 16_000_000;

/// User LED LD3 on PB3
const LED_PIN: u32 = 3;

// =============================================================================
// Board
// =============================================================================

/// Owns the peripherals the boot sequence touches.
pub struct Board {
    rcc: pac::RCC,
    pwr: pac::PWR,
    flash: pac::FLASH,
    lptim: pac::LPTIM,
    gpiob: pac::GPIOB,
    scb: cortex_m::peripheral::SCB,
}

impl Board {
    pub fn new(dp: pac::Peripherals, cp: cortex_m::Peripherals) -> Self {
        Self {
            rcc: dp.RCC,
            pwr: dp.PWR,
            flash: dp.FLASH,
            lptim: dp.LPTIM,
            gpiob: dp.GPIOB,
            scb: cp.SCB,
        }
    }

    /// Configure PB3 as push-pull output.
    pub fn init_led(&mut self) {
        self.enable_clock(L0Peripheral::GpioB.gate());
        self.gpiob.moder.modify(|r, w| unsafe {
            w.bits((r.bits() & !(0b11 << (LED_PIN * 2))) | (0b01 << (LED_PIN * 2)))
        });
    }

    /// Drive the user LED.
    pub fn set_led(&self, on: bool) {
        let bit = if on { 1 << LED_PIN } else { 1 << (LED_PIN + 16) };
        self.gpiob.bsrr.write(|w| unsafe { w.bits(bit) });
    }
}

impl SpinDelay for Board {
    fn spin(&mut self, iterations: u32) {
        CycleSpin.spin(iterations);
    }
}

impl BootHal for Board {
    fn enable_clock(&mut self, gate: ClockGate) {
        let mask = gate.mask();
        match gate.bus() {
            Bus::Ahb => self.rcc.ahbenr.modify(|r, w| unsafe { w.bits(r.bits() | mask) }),
            Bus::Apb1 => self.rcc.apb1enr.modify(|r, w| unsafe { w.bits(r.bits() | mask) }),
            Bus::Apb2 => self.rcc.apb2enr.modify(|r, w| unsafe { w.bits(r.bits() | mask) }),
            Bus::Iop => self.rcc.iopenr.modify(|r, w| unsafe { w.bits(r.bits() | mask) }),
        }
        // Two bus cycles before the peripheral registers respond
        cortex_m::asm::dsb();
    }

    fn set_tick_priority(&mut self, priority: u8) {
        unsafe { self.scb.set_priority(SystemHandler::SysTick, priority) };
    }

    fn configure_clock_tree(&mut self) -> u32 {
        // One wait state before raising SYSCLK above the 2.1 MHz MSI default
        self.flash
            .acr
            .modify(|r, w| unsafe { w.bits(r.bits() | FLASH_ACR_LATENCY) });

        self.rcc
            .cr
            .modify(|r, w| unsafe { w.bits(r.bits() | RCC_CR_HSI16ON) });
        while self.rcc.cr.read().bits() & RCC_CR_HSI16RDYF == 0 {}

        self.rcc.cfgr.modify(|r, w| unsafe {
            w.bits((r.bits() & !RCC_CFGR_SW_MASK) | RCC_CFGR_SW_HSI16)
        });
        while self.rcc.cfgr.read().bits() & RCC_CFGR_SWS_MASK != RCC_CFGR_SWS_HSI16 {}

        // LSE lives in the backup domain
        self.pwr
            .cr
            .modify(|r, w| unsafe { w.bits(r.bits() | PWR_CR_DBP) });
        self.rcc
            .csr
            .modify(|r, w| unsafe { w.bits(r.bits() | RCC_CSR_LSEON) });
        while self.rcc.csr.read().bits() & RCC_CSR_LSERDY == 0 {}

        CORE_CLOCK_HZ
    }

    fn init_time_base(&mut self) {
        self.rcc.ccipr.modify(|r, w| unsafe {
            w.bits((r.bits() & !RCC_CCIPR_LPTIM1SEL_MASK) | RCC_CCIPR_LPTIM1SEL_LSE)
        });
        self.enable_clock(L0Peripheral::Lptim1.gate());

        // Prescaler /1, CKSEL=0: LPTIM1 counts its LSE kernel clock.
        // CFGR is only writable while the timer is disabled.
        self.lptim
            .cfgr
            .modify(|r, w| unsafe { w.bits(r.bits() & !LPTIM_CFGR_PRESC_MASK) });
    }

    fn enable_time_base(&mut self) {
        self.lptim
            .cr
            .modify(|r, w| unsafe { w.bits(r.bits() | LPTIM_CR_ENABLE) });
    }

    fn set_auto_reload(&mut self, value: u32) {
        self.lptim.arr.write(|w| unsafe { w.bits(value & 0xFFFF) });
    }

    fn start_continuous(&mut self) {
        self.lptim
            .cr
            .modify(|r, w| unsafe { w.bits(r.bits() | LPTIM_CR_CNTSTRT) });
    }
}

impl CounterRead for Board {
    fn read_counter(&self) -> u32 {
        // CNT is asynchronous to the bus: read until two consecutive samples agree
        let mut last = self.lptim.cnt.read().bits();
        loop {
            let now = self.lptim.cnt.read().bits();
            if now == last {
                return now & 0xFFFF;
            }
            last = now;
        }
    }
}

// =============================================================================
// Fault Indicator
// =============================================================================

/// Fault platform that lights LD3 and parks the core.
pub struct LedFault<'a> {
    board: &'a Board,
}

impl<'a> LedFault<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self { board }
    }
}

impl FaultPlatform for LedFault<'_> {
    fn disable_interrupts(&mut self) {
        cortex_m::interrupt::disable();
    }

    fn report(&mut self, _record: &FaultRecord<'_>) {
        self.board.set_led(true);
    }

    fn idle(&mut self) {
        cortex_m::asm::nop();
    }
}

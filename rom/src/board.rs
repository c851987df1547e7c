//! Clock, watchdog and card power.

use pcmstream::hw::{Port, CARD_POWER_PIN, LED_PIN};
use volatile_register::{RO, RW};

const WDTCTL: usize = 0x0120;
const WDTPW: u16 = 0x5a00;
const WDTHOLD: u16 = 0x0080;

const DCOCTL: usize = 0x0056;
const BCSCTL1: usize = 0x0057;
const CALDCO_16MHZ: usize = 0x10f8;
const CALBC1_16MHZ: usize = 0x10f9;

const CYCLES_PER_MS: u16 = 16_000;

unsafe extern "C" {
    unsafe fn delay_loop(iterations: u16);
    unsafe fn disable_irq_handler();
}

#[inline(always)]
unsafe fn reg<T>(address: usize) -> &'static T {
    unsafe { &*(address as *const T) }
}

pub unsafe fn hold_watchdog() {
    unsafe { reg::<RW<u16>>(WDTCTL).write(WDTPW | WDTHOLD) };
}

/// Run MCLK and SMCLK from the factory 16 MHz DCO calibration.
pub fn init_clocks() {
    let (dco, bc1) = unsafe { (reg::<RO<u8>>(CALDCO_16MHZ).read(), reg::<RO<u8>>(CALBC1_16MHZ).read()) };
    // erased info segment
    if bc1 == 0xff {
        halt();
    }
    unsafe {
        reg::<RW<u8>>(DCOCTL).write(0);
        reg::<RW<u8>>(BCSCTL1).write(bc1);
        reg::<RW<u8>>(DCOCTL).write(dco);
    }
}

pub fn delay_ms(ms: u16) {
    for _ in 0..ms {
        unsafe { delay_loop(CYCLES_PER_MS / 3) };
    }
}

/// Cards come up reliably only from a clean supply edge.
pub fn power_cycle_card(port2: &mut Port) {
    port2.make_output(CARD_POWER_PIN);
    port2.set(CARD_POWER_PIN, false);
    delay_ms(100);
    port2.set(CARD_POWER_PIN, true);
    delay_ms(100);
}

/// Stop with the red LED on.
pub fn halt() -> ! {
    unsafe { disable_irq_handler() };
    // SAFETY: nothing else touches port 1 once we get here
    let mut port1 = unsafe { Port::port1() };
    port1.make_output(LED_PIN);
    port1.set(LED_PIN, true);
    loop {}
}

//! Timer1_A0 dispatch and the LPM0 wait.
//!
//! The vector trampoline in `vectors.s` calls [`timer1_a0_dispatch`] and
//! clears CPUOFF in the stacked status register when it returns non-zero, so
//! the main loop resumes after its `wait`.

use core::sync::atomic::{AtomicBool, Ordering};

use pcmstream::{LowPower, WakeSignal};

unsafe extern "C" {
    unsafe fn wait();
    unsafe fn enable_irq_handler();
}

static mut TICK_HANDLER: fn() = idle;
static WAKE: AtomicBool = AtomicBool::new(false);

fn idle() {}

/// Must run before [`enable_interrupts`].
pub fn register_tick(handler: fn()) {
    unsafe { TICK_HANDLER = handler };
}

pub fn enable_interrupts() {
    unsafe { enable_irq_handler() };
}

#[unsafe(no_mangle)]
extern "C" fn timer1_a0_dispatch() -> u16 {
    let handler = unsafe { TICK_HANDLER };
    handler();
    if WAKE.load(Ordering::Relaxed) {
        WAKE.store(false, Ordering::Relaxed);
        1
    } else {
        0
    }
}

/// Requests LPM0 exit on return from the current interrupt.
pub struct ExitLowPower;

impl WakeSignal for ExitLowPower {
    fn wake(&mut self) {
        WAKE.store(true, Ordering::Relaxed);
    }
}

pub struct Lpm0;

impl LowPower for Lpm0 {
    fn wait_for_interrupt(&mut self) {
        unsafe { wait() };
    }
}

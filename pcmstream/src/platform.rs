//! Seams between the core and the board (or a simulator).

use crate::sample::Duty;

/// PWM compare registers driving the output pins.
pub trait PwmOutput {
    /// Set the duty of output `channel` (0 = left/mono, 1 = right) for the next period.
    fn write_duty(&mut self, channel: usize, duty: Duty);
}

/// Called by the timer tick to pull the main loop out of its low-power wait.
pub trait WakeSignal {
    fn wake(&mut self);
}

/// The main loop's only suspension point.
pub trait LowPower {
    /// Sleep until the next interrupt.
    fn wait_for_interrupt(&mut self);
}

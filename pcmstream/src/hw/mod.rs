//! MSP430G2553 peripherals used by the player.
//!
//! Register blocks are laid out to match the device memory map and are only
//! meaningful on the target. Constructors are `unsafe`: they alias fixed
//! addresses and the caller must keep each block unique.
//!
//! | Block      | Base   | Use                                      |
//! |------------|--------|------------------------------------------|
//! | Timer1_A3  | 0x0180 | sample clock (CCR0) and PWM (CCR1, CCR2) |
//! | Port 1     | 0x0020 | status LED on P1.0                       |
//! | Port 2     | 0x0028 | PWM pins P2.1/P2.4, card power on P2.2   |

pub mod port;
pub mod timer_a;

pub use port::Port;
pub use timer_a::{CaptureControl, TimerA, TimerControl};

/// Red status LED, port 1.
pub const LED_PIN: usize = 0;

/// PWM output pin for the left (or mono) channel, TA1.1.
pub const LEFT_PIN: usize = 1;
/// Card supply switch.
pub const CARD_POWER_PIN: usize = 2;
/// PWM output pin for the right channel, TA1.2.
pub const RIGHT_PIN: usize = 4;

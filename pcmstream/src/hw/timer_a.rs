use volatile_register::RW;

use crate::platform::PwmOutput;
use crate::sample::Duty;

bitflags::bitflags! {
    /// TAxCTL
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct TimerControl: u16 {
        const TAIFG         = 0b0000_0000_0000_0001;
        const TAIE          = 0b0000_0000_0000_0010;
        const TACLR         = 0b0000_0000_0000_0100;

        // Bits 4-5: mode control
        const MC_STOP       = 0b0000_0000_0000_0000;
        const MC_UP         = 0b0000_0000_0001_0000;
        const MC_CONTINUOUS = 0b0000_0000_0010_0000;
        const MC_UP_DOWN    = 0b0000_0000_0011_0000;

        // Bits 6-7: input divider
        const ID_DIV1       = 0b0000_0000_0000_0000;
        const ID_DIV2       = 0b0000_0000_0100_0000;
        const ID_DIV4       = 0b0000_0000_1000_0000;
        const ID_DIV8       = 0b0000_0000_1100_0000;

        // Bits 8-9: clock source
        const TASSEL_TACLK  = 0b0000_0000_0000_0000;
        const TASSEL_ACLK   = 0b0000_0001_0000_0000;
        const TASSEL_SMCLK  = 0b0000_0010_0000_0000;
        const TASSEL_INCLK  = 0b0000_0011_0000_0000;
    }

    /// TAxCCTLn
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct CaptureControl: u16 {
        const CCIFG             = 0b0000_0000_0000_0001;
        const COV               = 0b0000_0000_0000_0010;
        const OUT               = 0b0000_0000_0000_0100;
        const CCI               = 0b0000_0000_0000_1000;
        const CCIE              = 0b0000_0000_0001_0000;

        // Bits 5-7: output mode
        const OUTMOD_OUT        = 0b0000_0000_0000_0000;
        const OUTMOD_SET        = 0b0000_0000_0010_0000;
        const OUTMOD_TOGGLE     = 0b0000_0000_1000_0000;
        const OUTMOD_RESET_SET  = 0b0000_0000_1110_0000;

        const CAP               = 0b0000_0001_0000_0000;
    }
}

impl TimerControl {
    pub const fn divider(div: u32) -> Self {
        match div {
            2 => Self::ID_DIV2,
            4 => Self::ID_DIV4,
            8 => Self::ID_DIV8,
            _ => Self::ID_DIV1,
        }
    }
}

/// Timer_A3 register block.
/// TAxCTL    +0x00
/// TAxCCTL0  +0x02 .. TAxCCTL2 +0x06
/// TAxR      +0x10
/// TAxCCR0   +0x12 .. TAxCCR2  +0x16
#[repr(C)]
pub struct TimerABlock {
    pub ctl: RW<u16>,
    pub cctl: [RW<u16>; 3],
    _reserved: [u16; 4],
    pub r: RW<u16>,
    pub ccr: [RW<u16>; 3],
}

pub const TIMER1_A3_BASE: usize = 0x0180;

/// Timer1_A3 driving the sample clock and both PWM outputs.
///
/// CCR0 sets the period (and interrupt), CCR1/CCR2 the left/right duty in
/// reset/set mode, so each pin is high from 0 to CCRn and low until CCR0.
pub struct TimerA {
    regs: &'static mut TimerABlock,
}

impl TimerA {
    /// # Safety
    /// Only one `TimerA` may exist; it takes over Timer1_A3.
    #[inline(always)]
    pub unsafe fn timer1() -> Self {
        Self { regs: unsafe { &mut *(TIMER1_A3_BASE as *mut TimerABlock) } }
    }

    /// Start up-mode PWM with period `top + 1` counts and the CCR0 interrupt on.
    pub fn configure_pwm(&mut self, top: u16, divider: u32) {
        let ctl = TimerControl::TASSEL_SMCLK | TimerControl::MC_UP | TimerControl::divider(divider);
        let output = CaptureControl::OUTMOD_RESET_SET;
        unsafe {
            self.regs.ctl.write(TimerControl::TACLR.bits());
            self.regs.ccr[0].write(top);
            self.regs.ccr[1].write(Duty::MIN.get() as u16);
            self.regs.ccr[2].write(Duty::MIN.get() as u16);
            self.regs.cctl[0].write(CaptureControl::CCIE.bits());
            self.regs.cctl[1].write(output.bits());
            self.regs.cctl[2].write(output.bits());
            self.regs.ctl.write(ctl.bits());
        }
    }
}

impl PwmOutput for TimerA {
    #[inline(always)]
    fn write_duty(&mut self, channel: usize, duty: Duty) {
        let ccr = if channel == 0 { &self.regs.ccr[1] } else { &self.regs.ccr[2] };
        unsafe { ccr.write(duty.get() as u16) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::offset_of;

    #[test]
    fn register_offsets() {
        assert_eq!(offset_of!(TimerABlock, cctl), 0x02);
        assert_eq!(offset_of!(TimerABlock, r), 0x10);
        assert_eq!(offset_of!(TimerABlock, ccr), 0x12);
        assert_eq!(TIMER1_A3_BASE + offset_of!(TimerABlock, ccr) + 2, 0x0194);
    }

    #[test]
    fn control_words() {
        let ctl = TimerControl::TASSEL_SMCLK | TimerControl::MC_UP | TimerControl::divider(2);
        assert_eq!(ctl.bits(), 0x0250);
        assert_eq!(TimerControl::divider(3), TimerControl::ID_DIV1);
        assert_eq!(CaptureControl::OUTMOD_RESET_SET.bits() | CaptureControl::CCIE.bits(), 0x00f0);
    }
}

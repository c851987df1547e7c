use bit_field::BitField;
use volatile_register::{RO, RW};

/// Digital I/O port register block.
/// PxIN  +0  PxOUT +1  PxDIR +2  PxIFG +3
/// PxIES +4  PxIE  +5  PxSEL +6  PxREN +7
#[repr(C)]
pub struct PortBlock {
    pub input: RO<u8>,
    pub out: RW<u8>,
    pub dir: RW<u8>,
    pub ifg: RW<u8>,
    pub ies: RW<u8>,
    pub ie: RW<u8>,
    pub sel: RW<u8>,
    pub ren: RW<u8>,
}

pub const PORT1_BASE: usize = 0x0020;
pub const PORT2_BASE: usize = 0x0028;

pub struct Port {
    regs: &'static mut PortBlock,
}

impl Port {
    /// # Safety
    /// Only one `Port` per port may exist.
    #[inline(always)]
    pub unsafe fn port1() -> Self {
        Self { regs: unsafe { &mut *(PORT1_BASE as *mut PortBlock) } }
    }

    /// # Safety
    /// Only one `Port` per port may exist.
    #[inline(always)]
    pub unsafe fn port2() -> Self {
        Self { regs: unsafe { &mut *(PORT2_BASE as *mut PortBlock) } }
    }

    /// Drive `pin` as a plain output.
    pub fn make_output(&mut self, pin: usize) {
        unsafe {
            self.regs.sel.modify(|mut sel| *sel.set_bit(pin, false));
            self.regs.dir.modify(|mut dir| *dir.set_bit(pin, true));
        }
    }

    /// Hand `pin` to its peripheral function (timer output) as an output.
    pub fn select_peripheral(&mut self, pin: usize) {
        unsafe {
            self.regs.dir.modify(|mut dir| *dir.set_bit(pin, true));
            self.regs.sel.modify(|mut sel| *sel.set_bit(pin, true));
        }
    }

    #[inline(always)]
    pub fn set(&mut self, pin: usize, high: bool) {
        unsafe { self.regs.out.modify(|mut out| *out.set_bit(pin, high)) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn register_layout() {
        assert_eq!(size_of::<PortBlock>(), 8);
        assert_eq!(PORT2_BASE + offset_of!(PortBlock, sel), 0x002e);
    }
}

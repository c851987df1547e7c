//! Binding to TI's MMC/SPI driver (`MMC.h`, `hal_SPI.h`).

use pcmstream::BlockSource;

const MMC_SUCCESS: u8 = 0x00;

#[allow(non_snake_case)]
unsafe extern "C" {
    unsafe fn mmcInit() -> u8;
    unsafe fn mmcPing() -> u8;
    unsafe fn mmcReadCardSize() -> u32;
    unsafe fn mmcMountBlock(address: u32, count: u16) -> u8;
    unsafe fn mmcUnmountBlock() -> u8;
    unsafe fn spiReadFrame(buffer: *mut u8, size: u16);
}

/// Driver result code other than `MMC_SUCCESS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MmcError(pub u8);

fn check(code: u8) -> Result<(), MmcError> {
    if code == MMC_SUCCESS { Ok(()) } else { Err(MmcError(code)) }
}

/// The card on USCI_B0. The driver keeps its own state, so one value stands
/// for the whole peripheral.
pub struct Mmc {
    _private: (),
}

impl Mmc {
    /// # Safety
    /// Only one `Mmc` may exist.
    pub unsafe fn take() -> Self {
        Self { _private: () }
    }
}

impl BlockSource for Mmc {
    type Error = MmcError;

    fn initialize(&mut self) -> Result<(), MmcError> {
        check(unsafe { mmcInit() })
    }

    fn ping(&mut self) -> Result<(), MmcError> {
        check(unsafe { mmcPing() })
    }

    fn card_size(&mut self) -> Option<u32> {
        match unsafe { mmcReadCardSize() } {
            0 => None,
            size => Some(size),
        }
    }

    fn mount_block(&mut self, address: u32, size: u16) -> Result<(), MmcError> {
        check(unsafe { mmcMountBlock(address, size) })
    }

    fn unmount_block(&mut self) -> Result<(), MmcError> {
        check(unsafe { mmcUnmountBlock() })
    }

    fn read_sequential(&mut self, buffer: &mut [u8]) {
        unsafe { spiReadFrame(buffer.as_mut_ptr(), buffer.len() as u16) };
    }
}

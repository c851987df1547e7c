//! Block storage interface consumed by the streaming core.
//!
//! The card protocol itself (SPI transport, command framing, CRC) lives
//! outside this crate. A driver only needs to expose mounting of one block at
//! a time and sequential reads from it.

use core::fmt::Debug;

/// Size of one addressable storage block in bytes.
pub const BLOCK_SIZE: u16 = 512;
/// Bytes pulled from the card per read transaction (one storage "frame").
pub const CHUNK_SIZE: usize = 8;
/// Read transactions that exhaust a mounted block.
pub const FRAMES_PER_BLOCK: u16 = BLOCK_SIZE / CHUNK_SIZE as u16;

/// A removable block device such as an MMC/SD card.
///
/// `Error` plays the role of the driver's result code.
pub trait BlockSource {
    type Error: Debug;

    /// Bring the card up. Callers retry this until it succeeds.
    fn initialize(&mut self) -> Result<(), Self::Error>;

    /// Verify the card answers after initialization.
    fn ping(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Card capacity in bytes, when the driver can report it.
    fn card_size(&mut self) -> Option<u32> {
        None
    }

    /// Make the block at `address` available for sequential reads.
    fn mount_block(&mut self, address: u32, size: u16) -> Result<(), Self::Error>;

    /// Release the mounted block.
    fn unmount_block(&mut self) -> Result<(), Self::Error>;

    /// Read the next `dst.len()` bytes of the mounted block.
    fn read_sequential(&mut self, dst: &mut [u8]);
}

/// Byte address of block `index`.
#[inline(always)]
pub const fn block_address(index: u32) -> u32 {
    index * BLOCK_SIZE as u32
}

//! Card image backed block source
//!
//! Serves a raw card image (as written by `dd` or `pcmsim pack`) through the
//! same block interface the firmware's MMC driver exposes.

use std::path::Path;

use pcmstream::storage::{BlockSource, BLOCK_SIZE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardError {
    /// Block extends past the end of the image.
    OutOfRange { address: u32 },
    BadBlockSize(u16),
}

pub struct FileCard {
    image: Vec<u8>,
    /// Read position and end of the mounted block.
    window: Option<(usize, usize)>,
}

impl FileCard {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        Ok(Self::from_image(std::fs::read(path)?))
    }

    pub fn from_image(image: Vec<u8>) -> Self {
        Self { image, window: None }
    }
}

impl BlockSource for FileCard {
    type Error = CardError;

    fn initialize(&mut self) -> Result<(), CardError> {
        self.window = None;
        Ok(())
    }

    fn card_size(&mut self) -> Option<u32> {
        u32::try_from(self.image.len()).ok()
    }

    fn mount_block(&mut self, address: u32, size: u16) -> Result<(), CardError> {
        if size != BLOCK_SIZE {
            return Err(CardError::BadBlockSize(size));
        }
        let start = address as usize;
        let end = start + size as usize;
        if end > self.image.len() {
            return Err(CardError::OutOfRange { address });
        }
        self.window = Some((start, end));
        Ok(())
    }

    fn unmount_block(&mut self) -> Result<(), CardError> {
        self.window = None;
        Ok(())
    }

    fn read_sequential(&mut self, dst: &mut [u8]) {
        // an idle SPI line reads back as 0xff
        let Some((pos, end)) = self.window.as_mut() else {
            dst.fill(0xff);
            return;
        };
        for byte in dst.iter_mut() {
            *byte = if *pos < *end { self.image[*pos] } else { 0xff };
            *pos += 1;
        }
    }
}

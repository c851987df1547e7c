//! In-memory card for unit tests.

use crate::header::{AuHeader, ENCODING_LINEAR_8, HEADER_LEN};
use crate::storage::{BlockSource, BLOCK_SIZE};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MountError {
    NotReady,
    Timeout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardOp {
    Init,
    Ping,
    Mount(u32),
    Unmount,
    Read(usize),
}

pub struct FakeCard {
    image: Vec<u8>,
    report_size: bool,
    mounted: Option<(usize, usize)>,
    init_failures: u32,
    mount_failures: u32,
    ops: Vec<CardOp>,
}

impl FakeCard {
    pub fn new(mut image: Vec<u8>) -> Self {
        let padded = image.len().div_ceil(BLOCK_SIZE as usize).max(1) * BLOCK_SIZE as usize;
        image.resize(padded, 0);
        FakeCard {
            image,
            report_size: false,
            mounted: None,
            init_failures: 0,
            mount_failures: 0,
            ops: Vec::new(),
        }
    }

    pub fn blank(blocks: usize) -> Self {
        Self::new(vec![0; blocks * BLOCK_SIZE as usize])
    }

    /// A card holding an `.au` header followed by `payload`.
    pub fn with_payload(payload: &[u8], channels: u32) -> Self {
        Self::new(au_image(payload, channels))
    }

    pub fn reporting_size(mut self) -> Self {
        self.report_size = true;
        self
    }

    pub fn fail_inits(&mut self, count: u32) {
        self.init_failures = count;
    }

    pub fn fail_mounts(&mut self, count: u32) {
        self.mount_failures = count;
    }

    pub fn take_ops(&mut self) -> Vec<CardOp> {
        core::mem::take(&mut self.ops)
    }
}

pub fn au_image(payload: &[u8], channels: u32) -> Vec<u8> {
    let header = AuHeader {
        data_offset: HEADER_LEN as u32,
        data_size: Some(payload.len() as u32),
        encoding: ENCODING_LINEAR_8,
        sample_rate: 31_250,
        channels,
    };
    let mut image = header.to_bytes().to_vec();
    image.extend_from_slice(payload);
    image
}

impl BlockSource for FakeCard {
    type Error = MountError;

    fn initialize(&mut self) -> Result<(), MountError> {
        self.ops.push(CardOp::Init);
        if self.init_failures > 0 {
            self.init_failures -= 1;
            return Err(MountError::NotReady);
        }
        Ok(())
    }

    fn ping(&mut self) -> Result<(), MountError> {
        self.ops.push(CardOp::Ping);
        Ok(())
    }

    fn card_size(&mut self) -> Option<u32> {
        self.report_size.then_some(self.image.len() as u32)
    }

    fn mount_block(&mut self, address: u32, size: u16) -> Result<(), MountError> {
        self.ops.push(CardOp::Mount(address));
        if self.mount_failures > 0 {
            self.mount_failures -= 1;
            return Err(MountError::Timeout);
        }
        let start = address as usize;
        if start + size as usize > self.image.len() {
            return Err(MountError::NotReady);
        }
        self.mounted = Some((start, start + size as usize));
        Ok(())
    }

    fn unmount_block(&mut self) -> Result<(), MountError> {
        self.ops.push(CardOp::Unmount);
        self.mounted = None;
        Ok(())
    }

    fn read_sequential(&mut self, dst: &mut [u8]) {
        self.ops.push(CardOp::Read(dst.len()));
        match &mut self.mounted {
            Some((pos, end)) => {
                for byte in dst.iter_mut() {
                    *byte = if *pos < *end { self.image[*pos] } else { 0xff };
                    *pos += 1;
                }
            }
            None => dst.fill(0xff),
        }
    }
}

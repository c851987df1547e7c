//! Position tracking inside the looped payload.
//!
//! The feeder reads the payload in [`CHUNK_SIZE`] frames. A block is done
//! after [`FRAMES_PER_BLOCK`] frames, or earlier when the payload ends. At
//! that point the cursor unmounts it and mounts the next one, or, at the end
//! of the payload, goes back to the block holding the first payload byte and
//! skips the header frames ahead of it.
//!
//! End of payload is tested with `bytes_consumed >= payload_length`: the last
//! chunk may run past an exact byte boundary.

use log::{debug, warn};

use crate::storage::{block_address, BlockSource, BLOCK_SIZE, CHUNK_SIZE, FRAMES_PER_BLOCK};

/// A read-frame position on the card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamPosition {
    pub block: u32,
    pub frame: u16,
}

impl StreamPosition {
    /// Position of byte `offset`, rounded down to its frame.
    pub const fn of_offset(offset: u32) -> Self {
        StreamPosition {
            block: offset / BLOCK_SIZE as u32,
            frame: ((offset % BLOCK_SIZE as u32) / CHUNK_SIZE as u32) as u16,
        }
    }
}

/// Where the payload lives. Fixed once the header is read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamLayout {
    pub payload_length: u32,
    pub start: StreamPosition,
}

impl StreamLayout {
    pub const fn new(data_offset: u32, payload_length: u32) -> Self {
        StreamLayout {
            payload_length,
            start: StreamPosition::of_offset(data_offset),
        }
    }
}

/// What a call to [`StreamCursor::advance`] did to the mounted block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// Still reading the same block.
    Within,
    /// Moved to the following block.
    NextBlock,
    /// Payload finished, back at the first payload byte.
    Wrapped,
}

pub struct StreamCursor<E> {
    layout: StreamLayout,
    block_index: u32,
    frames_in_block: u16,
    bytes_consumed: u32,
    mounted: bool,
    last_fault: Option<E>,
    faults: u32,
    rollovers: u32,
    wraps: u32,
}

impl<E: core::fmt::Debug> StreamCursor<E> {
    /// A cursor at the start of the payload. Nothing is mounted yet; call
    /// [`restart`](Self::restart) before feeding.
    pub fn new(layout: StreamLayout) -> Self {
        StreamCursor {
            layout,
            block_index: layout.start.block,
            frames_in_block: layout.start.frame,
            bytes_consumed: 0,
            mounted: false,
            last_fault: None,
            faults: 0,
            rollovers: 0,
            wraps: 0,
        }
    }

    /// Account for one frame read from the mounted block that yielded
    /// `bytes` payload bytes, rolling over to the next block when due.
    pub fn advance<S>(&mut self, bytes: u32, source: &mut S) -> Advance
    where
        S: BlockSource<Error = E>,
    {
        self.bytes_consumed += bytes;
        self.frames_in_block += 1;

        let finished = self.bytes_consumed >= self.layout.payload_length;
        if self.frames_in_block < FRAMES_PER_BLOCK && !finished {
            return Advance::Within;
        }

        self.release(source);
        self.rollovers += 1;
        if finished {
            self.wraps += 1;
            debug!("payload finished after {} bytes, looping", self.bytes_consumed);
            self.block_index = self.layout.start.block;
            self.bytes_consumed = 0;
            self.seek(source);
            Advance::Wrapped
        } else {
            self.block_index += 1;
            debug!("rollover to block {}", self.block_index);
            self.frames_in_block = 0;
            self.mount(source);
            Advance::NextBlock
        }
    }

    /// Unmount whatever is mounted and go back to the first payload byte.
    pub fn restart<S>(&mut self, source: &mut S) -> Result<(), E>
    where
        S: BlockSource<Error = E>,
        E: Clone,
    {
        self.release(source);
        self.block_index = self.layout.start.block;
        self.bytes_consumed = 0;
        self.seek(source);
        self.mount_result()
    }

    /// Re-attempt mounting the current block after a failed rollover.
    pub fn remount<S>(&mut self, source: &mut S) -> bool
    where
        S: BlockSource<Error = E>,
    {
        if self.mounted {
            return true;
        }
        if self.at_stream_start() {
            self.seek(source);
        } else {
            self.mount(source);
        }
        self.mounted
    }

    fn at_stream_start(&self) -> bool {
        self.bytes_consumed == 0 && self.block_index == self.layout.start.block
    }

    /// Mount `block_index` and skip to the first payload frame in it.
    fn seek<S>(&mut self, source: &mut S)
    where
        S: BlockSource<Error = E>,
    {
        self.frames_in_block = 0;
        if !self.mount(source) {
            return;
        }
        let mut scratch = [0u8; CHUNK_SIZE];
        for _ in 0..self.layout.start.frame {
            source.read_sequential(&mut scratch);
        }
        self.frames_in_block = self.layout.start.frame;
    }

    fn mount<S>(&mut self, source: &mut S) -> bool
    where
        S: BlockSource<Error = E>,
    {
        let address = block_address(self.block_index);
        match source.mount_block(address, BLOCK_SIZE) {
            Ok(()) => self.mounted = true,
            Err(err) => {
                warn!("mount of block {} at {:#x} failed: {:?}", self.block_index, address, err);
                self.record(err);
                self.mounted = false;
            }
        }
        self.mounted
    }

    fn release<S>(&mut self, source: &mut S)
    where
        S: BlockSource<Error = E>,
    {
        if !self.mounted {
            return;
        }
        if let Err(err) = source.unmount_block() {
            warn!("unmount of block {} failed: {:?}", self.block_index, err);
            self.record(err);
        }
        self.mounted = false;
    }

    fn record(&mut self, err: E) {
        self.faults += 1;
        self.last_fault = Some(err);
    }

    fn mount_result(&self) -> Result<(), E>
    where
        E: Clone,
    {
        match (&self.last_fault, self.mounted) {
            (_, true) => Ok(()),
            (Some(err), false) => Err(err.clone()),
            (None, false) => Ok(()),
        }
    }

    #[inline]
    pub fn payload_length(&self) -> u32 {
        self.layout.payload_length
    }

    #[inline]
    pub fn block_index(&self) -> u32 {
        self.block_index
    }

    #[inline]
    pub fn frames_in_block(&self) -> u16 {
        self.frames_in_block
    }

    #[inline]
    pub fn bytes_consumed(&self) -> u32 {
        self.bytes_consumed
    }

    /// Payload bytes left before the stream loops.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.layout.payload_length.saturating_sub(self.bytes_consumed)
    }

    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Result code of the most recent failed mount or unmount.
    pub fn last_fault(&self) -> Option<&E> {
        self.last_fault.as_ref()
    }

    pub fn faults(&self) -> u32 {
        self.faults
    }

    pub fn rollovers(&self) -> u32 {
        self.rollovers
    }

    pub fn wraps(&self) -> u32 {
        self.wraps
    }
}

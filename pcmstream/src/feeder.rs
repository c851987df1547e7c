//! Main-loop producer: card → bias → ring.

use crate::buffer::Producer;
use crate::platform::LowPower;
use crate::sample::to_unsigned;
use crate::storage::{BlockSource, CHUNK_SIZE};
use crate::stream::{Advance, StreamCursor};

/// Outcome of one feeder step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feed {
    /// A chunk was read and `samples` of its bytes were pushed.
    Pushed { samples: usize, advance: Advance },
    /// No room for a whole chunk.
    Full,
    /// The current block could not be mounted, or there is no payload.
    Stalled,
}

impl Feed {
    /// Whether the main loop should sleep until the next tick.
    #[inline]
    pub fn should_sleep(&self) -> bool {
        matches!(self, Feed::Full | Feed::Stalled)
    }
}

pub struct SampleFeeder<'a, S: BlockSource, const N: usize> {
    source: S,
    cursor: StreamCursor<S::Error>,
    producer: Producer<'a, N>,
    overruns: u32,
}

impl<'a, S: BlockSource, const N: usize> SampleFeeder<'a, S, N> {
    const WHOLE_CHUNKS: () = assert!(
        N >= CHUNK_SIZE && N % CHUNK_SIZE == 0,
        "buffer capacity must be a multiple of the chunk size"
    );

    pub fn new(source: S, cursor: StreamCursor<S::Error>, producer: Producer<'a, N>) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::WHOLE_CHUNKS;
        SampleFeeder { source, cursor, producer, overruns: 0 }
    }

    /// Move at most one chunk from the card into the ring.
    pub fn step(&mut self) -> Feed {
        if self.producer.available_space() < CHUNK_SIZE {
            return Feed::Full;
        }
        if self.cursor.payload_length() == 0 || !self.cursor.remount(&mut self.source) {
            return Feed::Stalled;
        }

        let mut chunk = [0u8; CHUNK_SIZE];
        self.source.read_sequential(&mut chunk);

        // bytes past the payload end are read to stay frame aligned, not played
        let samples = (self.cursor.remaining() as usize).min(CHUNK_SIZE);
        for &raw in &chunk[..samples] {
            if !self.producer.push(to_unsigned(raw)) {
                self.overruns += 1;
            }
        }

        let advance = self.cursor.advance(samples as u32, &mut self.source);
        Feed::Pushed { samples, advance }
    }

    /// One iteration of the main loop: feed, or sleep when there is nothing to do.
    pub fn poll<L: LowPower>(&mut self, low_power: &mut L) -> Feed {
        let feed = self.step();
        if feed.should_sleep() {
            low_power.wait_for_interrupt();
        }
        feed
    }

    pub fn run<L: LowPower>(&mut self, low_power: &mut L) -> ! {
        loop {
            self.poll(low_power);
        }
    }

    /// Fill the ring before the timer starts. Returns the samples pushed.
    pub fn fill(&mut self) -> usize {
        let mut pushed = 0;
        while let Feed::Pushed { samples, .. } = self.step() {
            pushed += samples;
        }
        pushed
    }

    pub fn cursor(&self) -> &StreamCursor<S::Error> {
        &self.cursor
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Pushes rejected by a full ring. Stays zero while the space check holds.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }
}

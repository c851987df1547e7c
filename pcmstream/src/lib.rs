//! Sample streaming core for PWM audio playback from block storage.
//!
//! Samples travel from a removable card to a timer-driven PWM pin through a
//! small ring buffer shared by two execution contexts on a single core:
//!
//! ```text
//!  BlockSource ──▶ SampleFeeder ──▶ SampleBuffer ──▶ PlaybackTimer ──▶ PWM pin
//!   (card)         (main loop)      (SPSC ring)      (timer interrupt)
//! ```
//!
//! - The main loop owns the [`Producer`] half of the buffer and the
//!   [`StreamCursor`]. It reads 8-byte chunks, adds the signed-to-unsigned
//!   bias and pushes them, then sleeps once there is no room for a chunk.
//! - The timer interrupt owns the [`Consumer`] half. Every period it pops one
//!   sample per channel into the compare registers and wakes the main loop.
//!
//! # Example
//!
//! ```rust,ignore
//! use pcmstream::{boot, PlaybackConfig, PlaybackTimer, RetryPolicy, SampleBuffer, SampleFeeder};
//!
//! let config = PlaybackConfig::REFERENCE;
//! let mut card = Mmc::new();
//! let boot = boot(&mut card, RetryPolicy::Forever, &config)?;
//!
//! let mut buffer = SampleBuffer::<40>::new();
//! let (producer, consumer) = buffer.split();
//! let mut feeder = SampleFeeder::new(card, boot.cursor, producer);
//! let mut timer = PlaybackTimer::new(consumer, pwm, config.channels);
//!
//! feeder.fill();
//! ```

#![cfg_attr(not(test), no_std)]

pub mod buffer;
pub mod config;
pub mod feeder;
pub mod header;
pub mod hw;
pub mod platform;
pub mod sample;
pub mod startup;
pub mod storage;
pub mod stream;
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;

pub use buffer::{Consumer, Producer, SampleBuffer};
pub use config::{Channels, PlaybackConfig, BUFFER_CAPACITY};
pub use feeder::{Feed, SampleFeeder};
pub use header::{AuHeader, HeaderError};
pub use platform::{LowPower, PwmOutput, WakeSignal};
pub use sample::{to_unsigned, Duty};
pub use startup::{boot, Boot, BootError, RetryPolicy};
pub use storage::{BlockSource, BLOCK_SIZE, CHUNK_SIZE, FRAMES_PER_BLOCK};
pub use stream::{Advance, StreamCursor, StreamLayout, StreamPosition};
pub use timer::{PlaybackTimer, Tick};

//! Card bring-up and stream positioning.

use core::fmt;
use core::num::NonZeroU32;

use log::{info, trace, warn};

use crate::config::{Channels, PlaybackConfig};
use crate::header::{AuHeader, HeaderError, ENCODING_LINEAR_8, HEADER_LEN};
use crate::storage::{BlockSource, BLOCK_SIZE, CHUNK_SIZE};
use crate::stream::{StreamCursor, StreamLayout};

/// How often a failing card operation is attempted before giving up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Spin until the card answers.
    Forever,
    Attempts(NonZeroU32),
}

impl RetryPolicy {
    /// At most `count` attempts. Zero still makes one.
    pub const fn attempts(count: u32) -> Self {
        match NonZeroU32::new(count) {
            Some(count) => RetryPolicy::Attempts(count),
            None => RetryPolicy::Attempts(NonZeroU32::MIN),
        }
    }

    /// Run `op` until it succeeds or the policy is exhausted.
    ///
    /// On success returns the value and the attempt that produced it.
    pub fn run<T, E, F>(&self, mut op: F) -> Result<(T, u32), E>
    where
        F: FnMut() -> Result<T, E>,
    {
        let mut attempt: u32 = 1;
        loop {
            match op() {
                Ok(value) => return Ok((value, attempt)),
                Err(err) => {
                    if let RetryPolicy::Attempts(limit) = self {
                        if attempt >= limit.get() {
                            return Err(err);
                        }
                    }
                    trace!("attempt {} failed", attempt);
                    attempt = attempt.saturating_add(1);
                }
            }
        }
    }
}

#[derive(Debug)]
pub enum BootError<E> {
    /// The card never initialized or answered within the retry policy.
    Card(E),
    /// The first payload block could not be mounted.
    Mount(E),
    Header(HeaderError),
}

impl<E: fmt::Debug> fmt::Display for BootError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootError::Card(err) => write!(f, "card not ready: {:?}", err),
            BootError::Mount(err) => write!(f, "mount failed: {:?}", err),
            BootError::Header(err) => write!(f, "bad header: {}", err),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for BootError<E> {}

impl<E> From<HeaderError> for BootError<E> {
    fn from(err: HeaderError) -> Self {
        BootError::Header(err)
    }
}

pub struct Boot<E> {
    pub header: AuHeader,
    /// Positioned on the first payload byte, with its block mounted.
    pub cursor: StreamCursor<E>,
}

/// Bring the card up, read the header and mount the first payload block.
pub fn boot<S>(
    source: &mut S,
    policy: RetryPolicy,
    config: &PlaybackConfig,
) -> Result<Boot<S::Error>, BootError<S::Error>>
where
    S: BlockSource,
    S::Error: Clone,
{
    let (_, attempts) = policy.run(|| source.initialize()).map_err(BootError::Card)?;
    info!("card initialized after {} attempt(s)", attempts);
    policy.run(|| source.ping()).map_err(BootError::Card)?;

    let card_size = source.card_size();
    if let Some(size) = card_size {
        info!("card size {} bytes", size);
    }

    source.mount_block(0, BLOCK_SIZE).map_err(BootError::Mount)?;
    let mut bytes = [0u8; HEADER_LEN];
    for frame in bytes.chunks_exact_mut(CHUNK_SIZE) {
        source.read_sequential(frame);
    }
    if let Err(err) = source.unmount_block() {
        warn!("unmount after header read failed: {:?}", err);
    }

    let header = AuHeader::parse(&bytes)?;
    let payload_length = header.payload_length(card_size)?;
    check_format(&header, payload_length, config);

    let mut cursor = StreamCursor::new(StreamLayout::new(header.data_offset, payload_length));
    cursor.restart(source).map_err(BootError::Mount)?;
    info!(
        "streaming {} bytes from offset {} ({} Hz, {:?})",
        payload_length,
        header.data_offset,
        config.sample_rate(),
        config.channels
    );

    Ok(Boot { header, cursor })
}

/// Playback format is fixed, so mismatches are reported and played anyway.
fn check_format(header: &AuHeader, payload_length: u32, config: &PlaybackConfig) {
    if header.encoding != ENCODING_LINEAR_8 {
        warn!("encoding {} is not 8-bit linear PCM", header.encoding);
    }
    if Channels::from_count(header.channels) != Some(config.channels) {
        warn!("header has {} channel(s), playing as {:?}", header.channels, config.channels);
    }
    if header.sample_rate != config.sample_rate() {
        warn!("header rate {} Hz, playing at {} Hz", header.sample_rate, config.sample_rate());
    }
    if config.channels == Channels::Stereo && payload_length % 2 != 0 {
        warn!("odd stereo payload, channels swap on every loop");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{au_image, CardOp, FakeCard, MountError};

    #[test]
    fn retry_until_success() {
        let mut failures = 3;
        let result = RetryPolicy::Forever.run(|| {
            if failures > 0 {
                failures -= 1;
                Err("busy")
            } else {
                Ok(7)
            }
        });
        assert_eq!(result, Ok((7, 4)));
    }

    #[test]
    fn bounded_retry_gives_up() {
        let mut calls = 0;
        let result: Result<((), u32), &str> = RetryPolicy::attempts(5).run(|| {
            calls += 1;
            Err("busy")
        });
        assert_eq!(result, Err("busy"));
        assert_eq!(calls, 5);
    }

    #[test]
    fn zero_attempts_runs_once() {
        let mut calls = 0;
        let result: Result<((), u32), &str> = RetryPolicy::attempts(0).run(|| {
            calls += 1;
            Err("busy")
        });
        assert_eq!(result, Err("busy"));
        assert_eq!(calls, 1);
        assert_eq!(RetryPolicy::attempts(0), RetryPolicy::attempts(1));
    }

    #[test]
    fn boot_retries_a_slow_card() {
        let mut card = FakeCard::with_payload(&[1, 2, 3, 4], 2);
        card.fail_inits(6);
        let boot = boot(&mut card, RetryPolicy::Forever, &PlaybackConfig::REFERENCE).unwrap();

        let inits = card.take_ops().iter().filter(|op| **op == CardOp::Init).count();
        assert_eq!(inits, 7);
        assert_eq!(boot.header.channels, 2);
        assert_eq!(boot.cursor.payload_length(), 4);
    }

    #[test]
    fn bounded_boot_reports_a_dead_card() {
        let mut card = FakeCard::with_payload(&[1, 2, 3, 4], 2);
        card.fail_inits(10);
        let err = boot(&mut card, RetryPolicy::attempts(3), &PlaybackConfig::REFERENCE)
            .err()
            .unwrap();
        assert!(matches!(err, BootError::Card(MountError::NotReady)));
        assert_eq!(card.take_ops().len(), 3);
    }

    #[test]
    fn boot_reads_header_and_positions_cursor() {
        let mut card = FakeCard::with_payload(&[9; 100], 2);
        let boot = boot(&mut card, RetryPolicy::Forever, &PlaybackConfig::REFERENCE).unwrap();

        assert_eq!(boot.cursor.block_index(), 0);
        assert_eq!(boot.cursor.frames_in_block(), 3);
        assert_eq!(boot.cursor.bytes_consumed(), 0);
        assert!(boot.cursor.is_mounted());
        assert_eq!(
            card.take_ops(),
            vec![
                CardOp::Init,
                CardOp::Ping,
                CardOp::Mount(0),
                CardOp::Read(8),
                CardOp::Read(8),
                CardOp::Read(8),
                CardOp::Unmount,
                CardOp::Mount(0),
                CardOp::Read(8),
                CardOp::Read(8),
                CardOp::Read(8),
            ]
        );
    }

    #[test]
    fn payload_is_clamped_to_the_card() {
        let mut image = au_image(&[0; 40], 1);
        // claim far more data than the single block holds
        image[8..12].copy_from_slice(&10_000u32.to_be_bytes());
        let mut card = FakeCard::new(image).reporting_size();
        let config = PlaybackConfig::REFERENCE.with_channels(Channels::Mono);
        let boot = boot(&mut card, RetryPolicy::Forever, &config).unwrap();
        assert_eq!(boot.cursor.payload_length(), 512 - 24);
    }

    #[test]
    fn rejects_a_card_without_header() {
        let mut card = FakeCard::blank(2);
        let err = boot(&mut card, RetryPolicy::Forever, &PlaybackConfig::REFERENCE)
            .err()
            .unwrap();
        assert!(matches!(err, BootError::Header(HeaderError::BadMagic(0))));
    }
}

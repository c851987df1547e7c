//! Static playback configuration.
//!
//! Nothing here changes at runtime. The firmware picks its channel layout
//! through Cargo features and passes a `PlaybackConfig` to the core.

use crate::storage::CHUNK_SIZE;

/// Ring capacity of the reference design: five chunks.
pub const BUFFER_CAPACITY: usize = 40;

const _: () = assert!(BUFFER_CAPACITY % CHUNK_SIZE == 0);

/// Output channel layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channels {
    /// One compare register (CCR1).
    Mono,
    /// Interleaved left/right pairs on CCR1 and CCR2.
    Stereo,
}

impl Channels {
    /// Samples consumed per timer period.
    #[inline(always)]
    pub const fn count(self) -> usize {
        match self {
            Channels::Mono => 1,
            Channels::Stereo => 2,
        }
    }

    pub const fn from_count(count: u32) -> Option<Self> {
        match count {
            1 => Some(Channels::Mono),
            2 => Some(Channels::Stereo),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackConfig {
    pub channels: Channels,
    /// Timer input clock (SMCLK) in Hz.
    pub clock_hz: u32,
    /// Timer input divider (1, 2, 4 or 8).
    pub clock_divider: u32,
    /// Timer period in counts minus one (CCR0). Also the full-scale duty.
    pub pwm_top: u16,
}

impl PlaybackConfig {
    /// 16 MHz DCO, SMCLK/2, 8-bit PWM: 31.25 kHz stereo.
    pub const REFERENCE: PlaybackConfig = PlaybackConfig {
        channels: Channels::Stereo,
        clock_hz: 16_000_000,
        clock_divider: 2,
        pwm_top: 255,
    };

    pub const fn with_channels(self, channels: Channels) -> Self {
        PlaybackConfig { channels, ..self }
    }

    /// Timer interrupt rate, which is also the per-channel sample rate.
    pub const fn sample_rate(&self) -> u32 {
        self.clock_hz / self.clock_divider / (self.pwm_top as u32 + 1)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self::REFERENCE
    }
}

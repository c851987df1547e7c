//! Timer-interrupt consumer: ring → PWM compare registers.
//!
//! [`PlaybackTimer::on_tick`] is the whole interrupt body. It does a fixed
//! amount of work (at most two pops and two register writes), never touches
//! storage and never blocks.

use crate::buffer::Consumer;
use crate::config::Channels;
use crate::platform::{PwmOutput, WakeSignal};
use crate::sample::Duty;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// One frame went out to the compare registers.
    Played,
    /// Not enough samples for a frame; registers keep their previous duty.
    Underrun,
}

pub struct PlaybackTimer<'a, P, const N: usize> {
    consumer: Consumer<'a, N>,
    output: P,
    channels: Channels,
    underruns: u32,
}

impl<'a, P: PwmOutput, const N: usize> PlaybackTimer<'a, P, N> {
    pub fn new(consumer: Consumer<'a, N>, output: P, channels: Channels) -> Self {
        PlaybackTimer { consumer, output, channels, underruns: 0 }
    }

    #[inline]
    pub fn on_tick<W: WakeSignal>(&mut self, wake: &mut W) -> Tick {
        let tick = if self.consumer.count() >= self.channels.count() {
            self.emit(0);
            if self.channels == Channels::Stereo {
                self.emit(1);
            }
            Tick::Played
        } else {
            self.underruns = self.underruns.wrapping_add(1);
            Tick::Underrun
        };

        // every period, so the feeder rechecks space even if it never slept
        wake.wake();
        tick
    }

    #[inline(always)]
    fn emit(&mut self, channel: usize) {
        if let Some(sample) = self.consumer.pop() {
            self.output.write_duty(channel, Duty::from_sample(sample));
        }
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    pub fn underruns(&self) -> u32 {
        self.underruns
    }

    pub fn output(&self) -> &P {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::SampleBuffer;

    #[derive(Default)]
    struct Registers {
        ccr: [u8; 2],
        writes: usize,
    }

    impl PwmOutput for Registers {
        fn write_duty(&mut self, channel: usize, duty: Duty) {
            self.ccr[channel] = duty.get();
            self.writes += 1;
        }
    }

    #[derive(Default)]
    struct Wakes(u32);

    impl WakeSignal for Wakes {
        fn wake(&mut self) {
            self.0 += 1;
        }
    }

    #[test]
    fn zero_sample_is_written_as_one() {
        let mut ring = SampleBuffer::<8>::new();
        let (mut tx, rx) = ring.split();
        let mut timer = PlaybackTimer::new(rx, Registers::default(), Channels::Mono);

        tx.push(0);
        tx.push(255);
        timer.on_tick(&mut Wakes::default());
        assert_eq!(timer.output().ccr[0], 1);
        timer.on_tick(&mut Wakes::default());
        assert_eq!(timer.output().ccr[0], 255);
    }

    #[test]
    fn underrun_skips_the_write_but_still_wakes() {
        let mut ring = SampleBuffer::<8>::new();
        let (mut tx, rx) = ring.split();
        let mut timer = PlaybackTimer::new(rx, Registers::default(), Channels::Stereo);
        let mut wakes = Wakes::default();

        assert_eq!(timer.on_tick(&mut wakes), Tick::Underrun);

        // half a frame is not enough for stereo
        tx.push(90);
        assert_eq!(timer.on_tick(&mut wakes), Tick::Underrun);
        assert_eq!(timer.output().writes, 0);
        assert_eq!(timer.underruns(), 2);

        tx.push(91);
        assert_eq!(timer.on_tick(&mut wakes), Tick::Played);
        assert_eq!(timer.output().ccr, [90, 91]);
        assert_eq!(wakes.0, 3);
    }

    #[test]
    fn stereo_consumes_pairs_in_order() {
        let mut ring = SampleBuffer::<8>::new();
        let (mut tx, rx) = ring.split();
        for sample in [10, 20, 30, 40] {
            tx.push(sample);
        }
        let mut timer = PlaybackTimer::new(rx, Registers::default(), Channels::Stereo);
        let mut wakes = Wakes::default();

        timer.on_tick(&mut wakes);
        assert_eq!(timer.output().ccr, [10, 20]);
        timer.on_tick(&mut wakes);
        assert_eq!(timer.output().ccr, [30, 40]);
        assert_eq!(tx.count(), 0);
    }
}

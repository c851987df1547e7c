//! Host simulation of the two execution contexts
//!
//! The main loop and the timer interrupt are interleaved on one thread: the
//! timer fires after every `feed_ratio` feeder polls, and whenever the feeder
//! enters its low-power wait (which on the device only ends with a tick).

use std::fmt::Debug;

use pcmstream::{
    BlockSource, Channels, Duty, LowPower, PlaybackTimer, PwmOutput, SampleBuffer, SampleFeeder,
    StreamCursor, Tick, WakeSignal, BUFFER_CAPACITY,
};

#[derive(Clone, Copy, Debug)]
pub struct SimOptions {
    pub ticks: u64,
    pub channels: Channels,
    /// Feeder polls per timer period.
    pub feed_ratio: u32,
}

#[derive(Debug, Default)]
pub struct Report {
    /// Compare register contents after every tick, one byte per channel.
    pub duties: Vec<u8>,
    pub ticks: u64,
    pub underruns: u64,
    pub sleeps: u64,
    pub rollovers: u32,
    pub wraps: u32,
    pub faults: u32,
    pub overruns: u32,
}

/// Captures compare register writes the way the timer holds them.
struct Registers {
    ccr: [u8; 2],
}

impl PwmOutput for Registers {
    fn write_duty(&mut self, channel: usize, duty: Duty) {
        debug_assert!(channel < 2);
        self.ccr[channel] = duty.get();
    }
}

struct Wake {
    pending: bool,
}

impl WakeSignal for Wake {
    fn wake(&mut self) {
        self.pending = true;
    }
}

struct Clock<'a> {
    timer: PlaybackTimer<'a, Registers, BUFFER_CAPACITY>,
    wake: Wake,
    limit: u64,
    report: Report,
}

impl Clock<'_> {
    fn tick(&mut self) {
        if self.report.ticks >= self.limit {
            return;
        }
        if self.timer.on_tick(&mut self.wake) == Tick::Underrun {
            self.report.underruns += 1;
        }
        let channels = self.timer.channels().count();
        self.report.duties.extend_from_slice(&self.timer.output().ccr[..channels]);
        self.report.ticks += 1;
    }

    fn done(&self) -> bool {
        self.report.ticks >= self.limit
    }
}

impl LowPower for Clock<'_> {
    fn wait_for_interrupt(&mut self) {
        self.report.sleeps += 1;
        self.wake.pending = false;
        while !self.wake.pending && !self.done() {
            self.tick();
        }
    }
}

/// Play from a booted cursor for `options.ticks` timer periods.
pub fn run<S>(source: S, cursor: StreamCursor<S::Error>, options: SimOptions) -> Report
where
    S: BlockSource,
    S::Error: Debug,
{
    let mut buffer = SampleBuffer::<BUFFER_CAPACITY>::new();
    let (producer, consumer) = buffer.split();

    let mut feeder = SampleFeeder::new(source, cursor, producer);
    let prefilled = feeder.fill();
    tracing::debug!("prefilled {} samples", prefilled);

    let registers = Registers { ccr: [Duty::MIN.get(); 2] };
    let mut clock = Clock {
        timer: PlaybackTimer::new(consumer, registers, options.channels),
        wake: Wake { pending: false },
        limit: options.ticks,
        report: Report::default(),
    };

    let feed_ratio = options.feed_ratio.max(1);
    let mut polls: u32 = 0;
    while !clock.done() {
        feeder.poll(&mut clock);
        polls += 1;
        if polls == feed_ratio {
            polls = 0;
            clock.tick();
        }
    }

    let mut report = clock.report;
    let cursor = feeder.cursor();
    report.rollovers = cursor.rollovers();
    report.wraps = cursor.wraps();
    report.faults = cursor.faults();
    report.overruns = feeder.overruns();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::FileCard;
    use crate::pack::pack;
    use pcmstream::{boot, to_unsigned, PlaybackConfig, RetryPolicy};

    fn simulate(payload: &[u8], channels: Channels, ticks: u64, feed_ratio: u32) -> Report {
        let image = pack(payload, 31_250, channels.count() as u32).unwrap();
        let mut card = FileCard::from_image(image);
        let config = PlaybackConfig::REFERENCE.with_channels(channels);
        let boot = boot(&mut card, RetryPolicy::attempts(3), &config).unwrap();
        run(card, boot.cursor, SimOptions { ticks, channels, feed_ratio })
    }

    #[test]
    fn loops_the_payload() {
        let payload: Vec<u8> = (0..700u32).map(|i| (i * 7) as u8).collect();
        let report = simulate(&payload, Channels::Mono, 2100, 1);

        assert_eq!(report.ticks, 2100);
        assert_eq!(report.underruns, 0);
        assert_eq!(report.overruns, 0);
        assert_eq!(report.wraps, 3);

        let expected: Vec<u8> = payload
            .iter()
            .cycle()
            .take(2100)
            .map(|&raw| Duty::from_sample(to_unsigned(raw)).get())
            .collect();
        assert_eq!(report.duties, expected);
    }

    #[test]
    fn stereo_writes_pairs() {
        let payload = [10u8, 20, 30, 40].map(|s| s.wrapping_sub(128));
        let report = simulate(&payload, Channels::Stereo, 4, 1);
        assert_eq!(report.duties, vec![10, 20, 30, 40, 10, 20, 30, 40]);
    }

    #[test]
    fn registers_hold_one_duty_per_channel() {
        let mut registers = Registers { ccr: [Duty::MIN.get(); 2] };
        registers.write_duty(0, Duty::from_sample(40));
        registers.write_duty(1, Duty::from_sample(0));
        assert_eq!(registers.ccr, [40, 1]);
    }

    #[test]
    #[should_panic]
    fn registers_reject_a_third_channel() {
        let mut registers = Registers { ccr: [Duty::MIN.get(); 2] };
        registers.write_duty(2, Duty::MIN);
    }

    #[test]
    fn sleeps_while_the_ring_is_full() {
        let payload = vec![0u8; 4096];
        let report = simulate(&payload, Channels::Mono, 1000, 16);
        assert!(report.sleeps > 0);
        assert_eq!(report.underruns, 0);
        // 488 payload bytes share block 0 with the header, block 1 ends at 1000
        assert_eq!(report.rollovers, 2);
    }
}

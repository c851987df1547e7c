#![no_std]
#![no_main]

mod board;
mod boot;
mod isr;
mod mmc;

use pcmstream::hw::{Port, TimerA, LEFT_PIN, RIGHT_PIN};
use pcmstream::{
    Channels, PlaybackConfig, PlaybackTimer, RetryPolicy, SampleBuffer, SampleFeeder, BUFFER_CAPACITY,
};

#[cfg(all(feature = "mono", feature = "stereo"))]
compile_error!("enable only one of the `mono` and `stereo` features");

#[cfg(feature = "mono")]
const CHANNELS: Channels = Channels::Mono;
#[cfg(not(feature = "mono"))]
const CHANNELS: Channels = Channels::Stereo;

const CONFIG: PlaybackConfig = PlaybackConfig::REFERENCE.with_channels(CHANNELS);

static RING: SampleBuffer<BUFFER_CAPACITY> = SampleBuffer::new();

/// Written once by `main` before interrupts are enabled, then owned by the
/// tick handler.
static mut PLAYBACK: Option<PlaybackTimer<'static, TimerA, BUFFER_CAPACITY>> = None;

fn playback_tick() {
    let playback = unsafe { &mut *(&raw mut PLAYBACK) };
    if let Some(timer) = playback.as_mut() {
        timer.on_tick(&mut isr::ExitLowPower);
    }
}

pub fn main() -> ! {
    board::init_clocks();

    let mut port2 = unsafe { Port::port2() };
    board::power_cycle_card(&mut port2);

    let mut card = unsafe { mmc::Mmc::take() };
    let boot = match pcmstream::boot(&mut card, RetryPolicy::Forever, &CONFIG) {
        Ok(boot) => boot,
        Err(_) => board::halt(),
    };

    let Some((producer, consumer)) = RING.split_static() else {
        board::halt()
    };
    let mut feeder = SampleFeeder::new(card, boot.cursor, producer);
    feeder.fill();

    let mut timer = unsafe { TimerA::timer1() };
    timer.configure_pwm(CONFIG.pwm_top, CONFIG.clock_divider);
    port2.select_peripheral(LEFT_PIN);
    if CHANNELS == Channels::Stereo {
        port2.select_peripheral(RIGHT_PIN);
    }

    unsafe { *(&raw mut PLAYBACK) = Some(PlaybackTimer::new(consumer, timer, CHANNELS)) };
    isr::register_tick(playback_tick);
    isr::enable_interrupts();

    feeder.run(&mut isr::Lpm0)
}

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{info, Level};

use pcmsim::card::FileCard;
use pcmsim::pack::{pack, read_header};
use pcmsim::sim::{self, SimOptions};
use pcmstream::{boot, Channels, PlaybackConfig, RetryPolicy};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a card image from raw signed 8-bit PCM
    Pack {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value_t = PlaybackConfig::REFERENCE.sample_rate())]
        rate: u32,
        #[arg(long, default_value_t = 2)]
        channels: u32,
    },

    /// Print the header of a card image
    Info { image: PathBuf },

    /// Run the player against a card image and record the PWM duty stream
    Play {
        image: PathBuf,
        /// Timer periods to simulate
        #[arg(long, default_value_t = 31_250)]
        ticks: u64,
        /// Output channel layout (1 or 2)
        #[arg(long, default_value_t = 2)]
        channels: u32,
        /// Feeder polls per timer period
        #[arg(long, default_value_t = 1)]
        feed_ratio: u32,
        /// Write the duty bytes here, one per channel per tick
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn channels(count: u32) -> Result<Channels> {
    match Channels::from_count(count) {
        Some(channels) => Ok(channels),
        None => bail!("unsupported channel count {}", count),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Pack { input, output, rate, channels: count } => {
            channels(count)?;
            let payload = std::fs::read(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let image = pack(&payload, rate, count)?;
            std::fs::write(&output, &image)
                .with_context(|| format!("failed to write {}", output.display()))?;
            info!("wrote {} bytes to {}", image.len(), output.display());
            println!("packed {} samples into {} blocks", payload.len(), image.len() / 512);
        }

        Commands::Info { image } => {
            let bytes = std::fs::read(&image)
                .with_context(|| format!("failed to read {}", image.display()))?;
            let header = read_header(&bytes)?;
            println!("data offset: {}", header.data_offset);
            match header.data_size {
                Some(size) => println!("data size:   {}", size),
                None => println!("data size:   unknown"),
            }
            println!("encoding:    {}", header.encoding);
            println!("sample rate: {}", header.sample_rate);
            println!("channels:    {}", header.channels);
        }

        Commands::Play { image, ticks, channels: count, feed_ratio, output } => {
            let config = PlaybackConfig::REFERENCE.with_channels(channels(count)?);
            let mut card = FileCard::open(&image)
                .with_context(|| format!("failed to open {}", image.display()))?;
            let boot = boot(&mut card, RetryPolicy::attempts(3), &config).context("boot failed")?;

            let report = sim::run(card, boot.cursor, SimOptions { ticks, channels: config.channels, feed_ratio });

            if let Some(output) = output {
                std::fs::write(&output, &report.duties)
                    .with_context(|| format!("failed to write {}", output.display()))?;
            }
            println!("ticks:     {}", report.ticks);
            println!("underruns: {}", report.underruns);
            println!("sleeps:    {}", report.sleeps);
            println!("rollovers: {}", report.rollovers);
            println!("wraps:     {}", report.wraps);
            println!("faults:    {}", report.faults);
            println!("overruns:  {}", report.overruns);
        }
    }

    Ok(())
}

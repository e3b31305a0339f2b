//! # BassBud Monitor
//!
//! Headless front end for the BassBud core. It captures the default input
//! device, runs the pitch tracker inside the audio callback and polls the
//! published reading on a fixed interval, printing the locked note, its
//! fretboard position and the notes of the selected mode.
//!
//! ## Architecture
//! - **Audio Thread**: cpal callback running the real-time tracker
//! - **Main Thread**: poll loop reading the lock-free snapshot
//! - **Communication**: crossbeam channels for stream errors and timing

mod display;

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use bassbud_core::fretboard::{DEFAULT_FRET_COUNT, Fretboard};
use bassbud_core::{AnalyzerConfig, LockedPitch, ScaleMode, audio};
use clap::{Arg, ArgAction, Command};
use crossbeam_channel::{after, never, select, tick};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use display::ReadingLine;

/// Poll interval of the display loop.
const DEFAULT_INTERVAL_MS: &str = "50";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("bassbud-monitor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Live bass pitch, fretboard position and mode feedback")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("JSON file overriding analyzer parameters"),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .value_name("MODE")
                .help("Mode name (ionian, dorian, ...) or index 0-6")
                .default_value("0"),
        )
        .arg(
            Arg::new("block-size")
                .short('b')
                .long("block-size")
                .value_name("SAMPLES")
                .help("Expected host block size")
                .default_value("2048"),
        )
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval-ms")
                .value_name("MS")
                .help("Display poll interval in milliseconds")
                .default_value(DEFAULT_INTERVAL_MS),
        )
        .arg(
            Arg::new("seconds")
                .short('s')
                .long("seconds")
                .value_name("SECONDS")
                .help("Stop after this many seconds (runs until killed by default)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print readings as JSON lines"),
        )
        .arg(
            Arg::new("fretboard")
                .long("fretboard")
                .action(ArgAction::SetTrue)
                .help("Print the highlighted fretboard with every new note"),
        )
        .get_matches();

    let config = match matches.get_one::<String>("config") {
        Some(path) => load_config(Path::new(path))?,
        None => AnalyzerConfig::default(),
    };
    config.validate().context("invalid analyzer configuration")?;

    let mode_arg = matches.get_one::<String>("mode").map(String::as_str).unwrap_or("0");
    let mode = ScaleMode::parse(mode_arg).ok_or_else(|| anyhow!("unknown mode '{mode_arg}'"))?;
    let block_size: usize = parse_arg(&matches, "block-size")?;
    let interval_ms: u64 = parse_arg(&matches, "interval")?;
    let seconds = matches
        .get_one::<String>("seconds")
        .map(|s| s.parse::<u64>())
        .transpose()
        .context("--seconds must be a whole number")?;
    let json = matches.get_flag("json");
    let show_fretboard = matches.get_flag("fretboard");

    let fretboard = Fretboard::from_tuning(&config.tuning, DEFAULT_FRET_COUNT)
        .ok_or_else(|| anyhow!("tuning contains an invalid open string"))?;

    let (error_tx, error_rx) = crossbeam_channel::bounded(16);
    let capture = audio::start_audio_capture(&config, block_size, error_tx)?;
    info!(
        "[monitor] listening on '{}' ({} Hz, window {} samples), mode {}",
        capture.device_name, capture.sample_rate, capture.window, mode
    );

    let ticker = tick(Duration::from_millis(interval_ms.max(1)));
    let deadline = seconds.map_or_else(never, |s| after(Duration::from_secs(s)));
    let mut last = None;

    loop {
        select! {
            recv(ticker) -> _ => {
                let current = capture.reading.load();
                if last == Some(current) {
                    continue;
                }
                let was_known = last.is_some_and(|r: LockedPitch| r.is_known());
                if current.is_known() && !was_known {
                    debug!("[monitor] locked {:.2} Hz", current.pitch);
                } else if !current.is_known() && was_known {
                    debug!("[monitor] signal faded, reading cleared");
                }
                last = Some(current);

                let line = ReadingLine::new(&current, mode);
                if json {
                    match serde_json::to_string(&line) {
                        Ok(text) => println!("{text}"),
                        Err(e) => warn!("[monitor] failed to encode reading: {e}"),
                    }
                } else {
                    println!("{line}");
                }
                if show_fretboard && current.note.is_some() {
                    print!("{}", display::render_fretboard(&fretboard, current.note, mode));
                }
            },
            recv(error_rx) -> msg => match msg {
                Ok(err) => warn!("[monitor] audio stream error: {err}"),
                Err(_) => {
                    error!("[monitor] audio error channel closed");
                    break;
                }
            },
            recv(deadline) -> _ => {
                info!("[monitor] time limit reached");
                break;
            },
        }
    }

    drop(capture);
    info!("[monitor] stopped");
    Ok(())
}

/// Loads analyzer parameters from a JSON file; missing fields keep their defaults.
fn load_config(path: &Path) -> Result<AnalyzerConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = serde_json::from_str(&data)
        .with_context(|| format!("parsing config {}", path.display()))?;
    info!("[monitor] loaded configuration from {}", path.display());
    Ok(config)
}

fn parse_arg<T>(matches: &clap::ArgMatches, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = matches
        .get_one::<String>(name)
        .ok_or_else(|| anyhow!("missing --{name}"))?;
    raw.parse()
        .with_context(|| format!("invalid value '{raw}' for --{name}"))
}

//! # Audio Capture Module
//!
//! This module handles real-time audio capture using CPAL (Cross-Platform Audio Library).
//! The [`BassTracker`] runs directly inside the input callback, so the only
//! things that leave the audio thread are the published reading and stream
//! errors.
//!
//! ## Features
//! - Automatic audio device selection
//! - Sample rate negotiation around 44.1 kHz
//! - Any channel count (the first channel is analysed)
//! - Stream errors forwarded over a channel instead of printed

use std::sync::Arc;

use anyhow::{Result, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{StreamError, SupportedStreamConfigRange};
use crossbeam_channel::Sender;
use tracing::info;

use crate::config::AnalyzerConfig;
use crate::snapshot::SharedReading;
use crate::tracker::BassTracker;

/// Preferred capture sample rate.
pub const TARGET_SAMPLE_RATE: u32 = 44_100;

/// Block size assumed when the host does not report one.
///
/// 2048 samples keep the period of a low E (about 1070 samples at 44.1 kHz)
/// inside the analysis window.
pub const DEFAULT_BLOCK_SIZE: usize = 2048;

/// A running capture stream and the reading it publishes.
pub struct Capture {
    /// Dropping the stream stops capture.
    pub stream: cpal::Stream,
    pub device_name: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub window: usize,
    pub reading: Arc<SharedReading>,
}

/// Starts audio capture from the default input device.
///
/// This function:
/// 1. Selects the default audio input device
/// 2. Picks an `f32` configuration as close as possible to 44.1 kHz
/// 3. Moves a freshly prepared [`BassTracker`] into the input callback
///
/// # Arguments
/// * `config` - Analyzer parameters
/// * `block_size` - Expected host block size; the window is `max(min_window, block_size)`
/// * `errors` - Receives stream errors raised on the audio thread
pub fn start_audio_capture(
    config: &AnalyzerConfig,
    block_size: usize,
    errors: Sender<StreamError>,
) -> Result<Capture> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;
    let device_name = device.name()?;
    info!("[audio] using input device: {device_name}");

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, TARGET_SAMPLE_RATE)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let sample_rate = supported_config
        .max_sample_rate()
        .0
        .min(TARGET_SAMPLE_RATE.max(supported_config.min_sample_rate().0));
    let config_range = supported_config.with_sample_rate(cpal::SampleRate(sample_rate));
    let channels = config_range.channels();
    let stream_config: cpal::StreamConfig = config_range.into();
    info!("[audio] selected {sample_rate} Hz, {channels} channel(s)");

    let mut tracker = BassTracker::prepare(config, sample_rate as f32, block_size)?;
    let window = tracker.window();
    let reading = tracker.reading();

    let stream = device.build_input_stream(
        &stream_config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            tracker.process_interleaved(data, usize::from(channels));
        },
        move |err| {
            // Drop the error if the monitor is not keeping up.
            let _ = errors.try_send(err);
        },
        None,
    )?;

    stream.play()?;

    Ok(Capture {
        stream,
        device_name,
        sample_rate,
        channels,
        window,
        reading,
    })
}

/// Finds the best supported audio configuration for the target sample rate.
///
/// Only `f32` formats qualify. Among those, fewer channels win, then the
/// range closest to `target_rate`.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32 && c.channels() > 0)
        .min_by_key(|c| {
            let (min_rate, max_rate) = (c.min_sample_rate().0, c.max_sample_rate().0);
            let rate_distance = if (min_rate..=max_rate).contains(&target_rate) {
                0
            } else {
                min_rate.abs_diff(target_rate).min(max_rate.abs_diff(target_rate))
            };
            (c.channels(), rate_distance)
        })
}

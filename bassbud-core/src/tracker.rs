//! # Bass Tracker
//!
//! Glues the real-time pipeline together: sample accumulation, YIN
//! detection, the stabilizer and publication of the locked reading.
//!
//! All buffers are allocated in [`BassTracker::prepare`]; processing a block
//! never allocates, blocks, logs or performs I/O. Lock and clear transitions
//! are observable only through the published [`SharedReading`].

use std::sync::Arc;

use tracing::debug;

use crate::config::{AnalyzerConfig, ConfigError};
use crate::pitch::YinDetector;
use crate::snapshot::{LockedPitch, SharedReading};
use crate::stabilizer::{PitchStabilizer, StabilizerEvent};
use crate::tuning::{self, Note, OpenString, STRING_COUNT};

#[derive(Debug)]
pub struct BassTracker {
    detector: YinDetector,
    stabilizer: PitchStabilizer,
    tuning: [OpenString; STRING_COUNT],
    frame: Vec<f32>,
    filled: usize,
    last_raw_pitch: Option<f32>,
    current: LockedPitch,
    reading: Arc<SharedReading>,
}

impl BassTracker {
    /// Builds a tracker for a sample rate and host block size.
    ///
    /// Frames of `max(config.min_window, host_block_size)` samples are
    /// analysed. Build a new tracker when the sample rate or block size changes.
    pub fn prepare(
        config: &AnalyzerConfig,
        sample_rate: f32,
        host_block_size: usize,
    ) -> Result<Self, ConfigError> {
        let window = config.window_size(host_block_size);
        let detector = YinDetector::new(config, sample_rate, window)?;
        debug!("[tracker] prepared: {sample_rate} Hz, window of {window} samples");
        Ok(Self {
            detector,
            stabilizer: PitchStabilizer::new(config.stability),
            tuning: config.tuning,
            frame: vec![0.0; window],
            filled: 0,
            last_raw_pitch: None,
            current: LockedPitch::unknown(),
            reading: Arc::new(SharedReading::new()),
        })
    }

    /// Handle for readers on other threads.
    pub fn reading(&self) -> Arc<SharedReading> {
        Arc::clone(&self.reading)
    }

    /// The reading last published by this tracker.
    pub fn current(&self) -> LockedPitch {
        self.current
    }

    pub fn window(&self) -> usize {
        self.frame.len()
    }

    /// Raw detector output of the most recent frame.
    pub fn last_raw_pitch(&self) -> Option<f32> {
        self.last_raw_pitch
    }

    pub fn stabilizer(&self) -> &PitchStabilizer {
        &self.stabilizer
    }

    /// Feeds a mono block.
    pub fn process_block(&mut self, block: &[f32]) {
        self.push_samples(block.iter().copied());
    }

    /// Feeds an interleaved block, analysing only its first channel.
    pub fn process_interleaved(&mut self, data: &[f32], channels: usize) {
        self.push_samples(data.iter().step_by(channels.max(1)).copied());
    }

    fn push_samples(&mut self, samples: impl Iterator<Item = f32>) {
        for sample in samples {
            self.frame[self.filled] = sample;
            self.filled += 1;
            if self.filled == self.frame.len() {
                self.filled = 0;
                self.analyze_frame();
            }
        }
    }

    fn analyze_frame(&mut self) {
        let raw = self.detector.detect(&self.frame);
        self.last_raw_pitch = raw;

        match self.stabilizer.update(raw) {
            StabilizerEvent::Hold => {}
            StabilizerEvent::Locked(pitch) => {
                self.current = locate(pitch, &self.tuning);
                self.reading.publish(&self.current);
            }
            StabilizerEvent::Cleared => {
                self.current = LockedPitch::unknown();
                self.reading.publish(&self.current);
            }
        }
    }
}

/// Maps a committed pitch onto its note and fretboard position.
pub fn locate(pitch: f32, tuning: &[OpenString]) -> LockedPitch {
    match tuning::fret_position(pitch, tuning) {
        Some(position) => LockedPitch {
            pitch,
            note: Note::from_frequency(pitch),
            position: Some(position),
        },
        None => LockedPitch {
            pitch,
            note: None,
            position: None,
        },
    }
}

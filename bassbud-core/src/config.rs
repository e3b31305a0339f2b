//! # Analyzer Configuration
//!
//! Every empirically tuned constant used by the analysis pipeline lives here,
//! so that the algorithms never hard-code a threshold. The defaults reproduce
//! the tuned behaviour for a 4-string bass in standard tuning.
//!
//! Configurations are plain serde structs; a partial JSON document overrides
//! only the fields it names.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tuning::{OpenString, STANDARD_BASS_TUNING, STRING_COUNT};

/// Reasons an [`AnalyzerConfig`] (or tracker setup) is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid pitch range: {min} Hz to {max} Hz")]
    PitchRange { min: f32, max: f32 },
    #[error("YIN threshold must be in (0, 1), got {0}")]
    YinThreshold(f32),
    #[error("low-pass coefficients must be in [0, 1], got feedback={feedback} input={input}")]
    LowPass { feedback: f32, input: f32 },
    #[error("smoothing weights must be in [0, 1], got history={history} input={input}")]
    Smoothing { history: f32, input: f32 },
    #[error("stability window must be positive, got {0} Hz")]
    StabilityWindow(f32),
    #[error("at least one stable frame is required")]
    RequiredFrames,
    #[error("decay factor must be in (0, 1), got {0}")]
    DecayFactor(f32),
    #[error("decay floor must be non-negative, got {0} Hz")]
    DecayFloor(f32),
    #[error("analysis window must hold at least 2 samples, got {0}")]
    Window(usize),
    #[error("open string {index} has invalid frequency {frequency} Hz")]
    OpenString { index: usize, frequency: f32 },
    #[error("sample rate must be positive, got {0} Hz")]
    SampleRate(f32),
}

/// Single-pole low-pass coefficients: `y = feedback * y_prev + input * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowPassConfig {
    pub feedback: f32,
    pub input: f32,
}

impl Default for LowPassConfig {
    fn default() -> Self {
        Self {
            feedback: 0.95,
            input: 0.05,
        }
    }
}

/// Hysteresis parameters of the pitch stabilizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Maximum distance (Hz) between a new estimate and the smoothed pitch
    /// for the two to count as agreeing.
    pub window_hz: f32,
    /// Consecutive agreeing frames needed before a pitch is committed.
    pub required_frames: u32,
    /// Weight of the previous smoothed pitch.
    pub history_weight: f32,
    /// Weight of the incoming estimate.
    pub input_weight: f32,
    /// Multiplier applied to the smoothed pitch on every invalid frame.
    pub decay_factor: f32,
    /// Below this the smoothed pitch is dropped and the reading cleared.
    pub decay_floor_hz: f32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            window_hz: 3.0,
            required_frames: 3,
            history_weight: 0.7,
            input_weight: 0.3,
            decay_factor: 0.9,
            decay_floor_hz: 30.0,
        }
    }
}

/// Complete set of domain parameters for a [`crate::BassTracker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Lowest pitch reported by the detector (Hz).
    pub min_pitch_hz: f32,
    /// Highest pitch reported by the detector (Hz).
    pub max_pitch_hz: f32,
    /// Absolute threshold on the cumulative mean normalized difference.
    pub yin_threshold: f32,
    pub low_pass: LowPassConfig,
    pub stability: StabilityConfig,
    /// The analysis window is `max(min_window, host block size)` samples.
    pub min_window: usize,
    /// Open strings, highest (index 0) to lowest.
    pub tuning: [OpenString; STRING_COUNT],
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_pitch_hz: 40.0,
            max_pitch_hz: 400.0,
            yin_threshold: 0.03,
            low_pass: LowPassConfig::default(),
            stability: StabilityConfig::default(),
            min_window: 1024,
            tuning: STANDARD_BASS_TUNING,
        }
    }
}

impl AnalyzerConfig {
    /// Number of samples analysed per frame for a given host block size.
    pub fn window_size(&self, host_block_size: usize) -> usize {
        self.min_window.max(host_block_size)
    }

    /// Checks that every parameter is usable by the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = |v: f32| (0.0..=1.0).contains(&v);

        if !(self.min_pitch_hz.is_finite() && self.max_pitch_hz.is_finite())
            || self.min_pitch_hz <= 0.0
            || self.min_pitch_hz >= self.max_pitch_hz
        {
            return Err(ConfigError::PitchRange {
                min: self.min_pitch_hz,
                max: self.max_pitch_hz,
            });
        }
        if !(self.yin_threshold > 0.0 && self.yin_threshold < 1.0) {
            return Err(ConfigError::YinThreshold(self.yin_threshold));
        }
        if !unit(self.low_pass.feedback) || !unit(self.low_pass.input) {
            return Err(ConfigError::LowPass {
                feedback: self.low_pass.feedback,
                input: self.low_pass.input,
            });
        }

        let stability = &self.stability;
        if !unit(stability.history_weight) || !unit(stability.input_weight) {
            return Err(ConfigError::Smoothing {
                history: stability.history_weight,
                input: stability.input_weight,
            });
        }
        if !(stability.window_hz > 0.0) {
            return Err(ConfigError::StabilityWindow(stability.window_hz));
        }
        if stability.required_frames == 0 {
            return Err(ConfigError::RequiredFrames);
        }
        if !(stability.decay_factor > 0.0 && stability.decay_factor < 1.0) {
            return Err(ConfigError::DecayFactor(stability.decay_factor));
        }
        if !(stability.decay_floor_hz >= 0.0) {
            return Err(ConfigError::DecayFloor(stability.decay_floor_hz));
        }

        if self.min_window < 2 {
            return Err(ConfigError::Window(self.min_window));
        }
        if let Some((index, string)) = self
            .tuning
            .iter()
            .enumerate()
            .find(|(_, s)| !(s.frequency.is_finite() && s.frequency > 0.0))
        {
            return Err(ConfigError::OpenString {
                index,
                frequency: string.frequency,
            });
        }
        Ok(())
    }
}

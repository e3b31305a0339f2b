//! # Pitch Detection Module
//!
//! This module implements the YIN periodicity estimator used to find the
//! fundamental of a bass note. Every buffer it needs is allocated when the
//! detector is built, so [`YinDetector::detect`] can run on the real-time
//! audio path.
//!
//! ## Pipeline
//! 1. One-pole low-pass filtering (state persists between frames)
//! 2. Squared difference function over all lags
//! 3. Cumulative mean normalized difference (CMND)
//! 4. Absolute threshold search, descending to the local minimum
//! 5. Parabolic interpolation for a fractional lag
//! 6. Conversion to Hz and range gating

use crate::config::{AnalyzerConfig, ConfigError};
use crate::filter::OnePoleLowPass;

/// A YIN pitch detector for a fixed window size and sample rate.
///
/// Rebuild the detector when either of them changes.
#[derive(Debug, Clone)]
pub struct YinDetector {
    sample_rate: f32,
    threshold: f32,
    min_pitch_hz: f32,
    max_pitch_hz: f32,
    filter: OnePoleLowPass,
    filtered: Vec<f32>,
    yin_buffer: Vec<f32>,
}

impl YinDetector {
    /// Creates a detector analysing `window` samples per frame.
    pub fn new(
        config: &AnalyzerConfig,
        sample_rate: f32,
        window: usize,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(ConfigError::SampleRate(sample_rate));
        }
        if window < 2 {
            return Err(ConfigError::Window(window));
        }
        Ok(Self {
            sample_rate,
            threshold: config.yin_threshold,
            min_pitch_hz: config.min_pitch_hz,
            max_pitch_hz: config.max_pitch_hz,
            filter: OnePoleLowPass::new(config.low_pass),
            filtered: vec![0.0; window],
            yin_buffer: vec![0.0; window],
        })
    }

    pub fn window(&self) -> usize {
        self.yin_buffer.len()
    }

    /// Estimates the fundamental of one frame.
    ///
    /// `frame` must hold exactly [`Self::window`] samples; anything else is
    /// reported as no pitch. Returns `None` when no lag passes the threshold or
    /// the resulting pitch falls outside the configured range.
    pub fn detect(&mut self, frame: &[f32]) -> Option<f32> {
        if frame.len() != self.window() {
            return None;
        }

        self.filter.process_into(frame, &mut self.filtered);
        difference(&self.filtered, &mut self.yin_buffer);
        cumulative_mean_normalized_difference(&mut self.yin_buffer);

        let tau = absolute_threshold(&self.yin_buffer, self.threshold)?;
        let better_tau = parabolic_interpolation(&self.yin_buffer, tau);
        let pitch = self.sample_rate / better_tau;

        (pitch.is_finite() && pitch >= self.min_pitch_hz && pitch <= self.max_pitch_hz)
            .then_some(pitch)
    }
}

/// Squared difference function: `out[tau] = sum_i (x[i] - x[i + tau])^2`.
///
/// `out[0]` is zeroed. `out` must be as long as `signal`.
pub fn difference(signal: &[f32], out: &mut [f32]) {
    debug_assert_eq!(signal.len(), out.len());
    let n = signal.len();
    out.fill(0.0);
    for tau in 1..n {
        out[tau] = signal[..n - tau]
            .iter()
            .zip(&signal[tau..])
            .map(|(a, b)| {
                let delta = a - b;
                delta * delta
            })
            .sum();
    }
}

/// Turns a difference function into its cumulative mean normalized form, in place.
///
/// `d'(0)` is fixed to 1. While the running sum is still zero (silence) the
/// value is also set to 1 so it can never pass the threshold.
pub fn cumulative_mean_normalized_difference(buffer: &mut [f32]) {
    let Some((first, rest)) = buffer.split_first_mut() else {
        return;
    };
    *first = 1.0;

    let mut running_sum = 0.0;
    for (i, value) in rest.iter_mut().enumerate() {
        let tau = (i + 1) as f32;
        running_sum += *value;
        if running_sum != 0.0 {
            *value *= tau / running_sum;
        } else {
            *value = 1.0;
        }
    }
}

/// Finds the first lag (from 2) whose CMND is below `threshold`, then follows
/// the descent to the bottom of that dip.
pub fn absolute_threshold(cmnd: &[f32], threshold: f32) -> Option<usize> {
    let mut tau = (2..cmnd.len()).find(|&tau| cmnd[tau] < threshold)?;
    while tau + 1 < cmnd.len() && cmnd[tau + 1] < cmnd[tau] {
        tau += 1;
    }
    Some(tau)
}

/// Refines an integer lag by fitting a parabola through it and its neighbours.
///
/// At the lower boundary the better of `tau` and its right neighbour is
/// returned; a flat (zero-curvature) neighbourhood returns `tau` unchanged.
pub fn parabolic_interpolation(cmnd: &[f32], tau: usize) -> f32 {
    let x0 = if tau < 1 { tau } else { tau - 1 };
    let x2 = if tau + 1 < cmnd.len() { tau + 1 } else { tau };

    if x0 == tau {
        return if cmnd[tau] <= cmnd[x2] {
            tau as f32
        } else {
            x2 as f32
        };
    }

    let s0 = cmnd[x0];
    let s1 = cmnd[tau];
    let s2 = cmnd[x2];
    let denominator = 2.0 * (2.0 * s1 - s2 - s0);
    if denominator == 0.0 {
        return tau as f32;
    }

    let better_tau = tau as f32 + (s2 - s0) / denominator;
    if better_tau.is_finite() {
        better_tau
    } else {
        tau as f32
    }
}

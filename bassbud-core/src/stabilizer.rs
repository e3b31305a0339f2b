//! Hysteresis gate turning noisy per-frame pitch estimates into a locked pitch.
//!
//! States:
//! - **Unlocked**: no smoothed pitch. A valid estimate seeds tracking.
//! - **Tracking**: estimates within the stability window are blended in and
//!   counted; enough consecutive agreeing frames commit the pitch (**Locked**).
//!   A large jump restarts tracking at the new value.
//! - Invalid frames reset the count and decay the smoothed pitch until it
//!   drops below the floor, which clears the reading.

use crate::config::StabilityConfig;

/// Result of feeding one frame into the stabilizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StabilizerEvent {
    /// Nothing to publish; the locked pitch (if any) is unchanged.
    Hold,
    /// Commit this pitch as the locked pitch.
    Locked(f32),
    /// The signal faded out; the locked pitch must be cleared.
    Cleared,
}

#[derive(Debug, Clone)]
pub struct PitchStabilizer {
    params: StabilityConfig,
    smoothed_pitch: f32,
    stable_frames: u32,
}

impl PitchStabilizer {
    pub fn new(params: StabilityConfig) -> Self {
        Self {
            params,
            smoothed_pitch: 0.0,
            stable_frames: 0,
        }
    }

    pub fn smoothed_pitch(&self) -> f32 {
        self.smoothed_pitch
    }

    pub fn stable_frames(&self) -> u32 {
        self.stable_frames
    }

    pub fn is_tracking(&self) -> bool {
        self.smoothed_pitch > 0.0
    }

    /// Advances the state machine by one frame. `raw` is `None` when the
    /// detector found no usable pitch.
    pub fn update(&mut self, raw: Option<f32>) -> StabilizerEvent {
        match raw.filter(|p| p.is_finite() && *p > 0.0) {
            Some(pitch) => self.on_pitch(pitch),
            None => self.on_invalid(),
        }
    }

    fn on_pitch(&mut self, pitch: f32) -> StabilizerEvent {
        if !self.is_tracking() {
            self.smoothed_pitch = pitch;
            self.stable_frames = 0;
            return StabilizerEvent::Hold;
        }

        if (pitch - self.smoothed_pitch).abs() < self.params.window_hz {
            self.smoothed_pitch =
                self.params.history_weight * self.smoothed_pitch + self.params.input_weight * pitch;
            self.stable_frames = self.stable_frames.saturating_add(1);
            if self.stable_frames >= self.params.required_frames {
                return StabilizerEvent::Locked(self.smoothed_pitch);
            }
        } else {
            self.stable_frames = 0;
            self.smoothed_pitch = pitch;
        }
        StabilizerEvent::Hold
    }

    fn on_invalid(&mut self) -> StabilizerEvent {
        self.stable_frames = 0;
        if !self.is_tracking() {
            return StabilizerEvent::Hold;
        }

        self.smoothed_pitch *= self.params.decay_factor;
        if self.smoothed_pitch < self.params.decay_floor_hz {
            self.smoothed_pitch = 0.0;
            return StabilizerEvent::Cleared;
        }
        StabilizerEvent::Hold
    }
}

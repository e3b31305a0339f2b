//! Single-pole low-pass filter used to strip high-frequency noise before
//! periodicity analysis.

use crate::config::LowPassConfig;

/// A one-pole smoother: `y[n] = feedback * y[n-1] + input * x[n]`.
///
/// The state carries over between blocks; it is only reset when the
/// owning detector is rebuilt.
#[derive(Debug, Clone)]
pub struct OnePoleLowPass {
    feedback: f32,
    input: f32,
    state: f32,
}

impl OnePoleLowPass {
    pub fn new(coefficients: LowPassConfig) -> Self {
        Self {
            feedback: coefficients.feedback,
            input: coefficients.input,
            state: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        self.state = self.feedback * self.state + self.input * sample;
        self.state
    }

    /// Filters `input` into `output` in order. Both slices must have the same length.
    pub fn process_into(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), output.len());
        for (out, &sample) in output.iter_mut().zip(input) {
            *out = self.process(sample);
        }
    }

    pub fn state(&self) -> f32 {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_the_recurrence() {
        let mut filter = OnePoleLowPass::new(LowPassConfig::default());
        assert!((filter.process(1.0) - 0.05).abs() < 1e-7);
        assert!((filter.process(1.0) - (0.95 * 0.05 + 0.05)).abs() < 1e-7);
    }

    #[test]
    fn state_persists_across_blocks() {
        let mut split = OnePoleLowPass::new(LowPassConfig::default());
        let mut whole = OnePoleLowPass::new(LowPassConfig::default());
        let input: Vec<f32> = (0..64).map(|i| ((i * 7) % 5) as f32 - 2.0).collect();

        let mut a = vec![0.0; 64];
        split.process_into(&input[..20], &mut a[..20]);
        split.process_into(&input[20..], &mut a[20..]);

        let mut b = vec![0.0; 64];
        whole.process_into(&input, &mut b);

        assert_eq!(a, b);
        assert_eq!(split.state(), whole.state());
    }

    #[test]
    fn settles_on_dc() {
        let mut filter = OnePoleLowPass::new(LowPassConfig::default());
        let mut last = 0.0;
        for _ in 0..1000 {
            last = filter.process(0.5);
        }
        assert!((last - 0.5).abs() < 1e-4);
    }
}

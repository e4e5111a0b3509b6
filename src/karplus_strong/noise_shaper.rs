// noise_shaper.rs

use std::f32::consts::PI;

/// One-pole low-pass run over white noise to build a pluck excitation.
///
/// `smoothing` is the feedback coefficient: 0 passes the noise through
/// untouched, values near 1 give a dark, rounded burst.
#[derive(Clone, Debug)]
pub struct NoiseShaper {
    smoothing: f32,
    state: f32,
}

impl NoiseShaper {
    pub fn new(smoothing: f32) -> Self {
        Self {
            smoothing: smoothing.clamp(0.0, 1.0),
            state: 0.0,
        }
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }

    #[inline]
    pub fn process(&mut self, white: f32) -> f32 {
        self.state = self.smoothing * self.state + (1.0 - self.smoothing) * white;
        self.state
    }
}

/// Half-sine window over the excitation, mixed in by `pick_position`.
///
/// A pick position of 0 leaves the burst flat; 1 tapers it to zero at both
/// ends of the delay line.
#[inline]
pub fn pick_window(index: usize, length: usize, pick_position: f32) -> f32 {
    if length == 0 {
        return 0.0;
    }
    let phase = PI * (index as f32 + 0.5) / length as f32;
    (1.0 - pick_position) + pick_position * phase.sin()
}

// audio_context.rs

use crate::error::ConfigError;
use crate::guitar::guitar::check_range;

pub const DEFAULT_SAMPLE_RATE: f32 = 44100.0;
pub const DEFAULT_BLOCK_SIZE: usize = 256;
pub const MIN_SAMPLE_RATE: f32 = 8_000.0;
pub const MAX_SAMPLE_RATE: f32 = 384_000.0;

/// Properties of the audio output an instrument renders for.
///
/// Owned by the application and handed by reference to whatever builds
/// voices, so sample-rate-dependent state is sized once at construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioContext {
    pub sample_rate: f32,
    pub block_size: usize,
}

impl Default for AudioContext {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE, DEFAULT_BLOCK_SIZE)
    }
}

impl AudioContext {
    pub fn new(sample_rate: f32, block_size: usize) -> Self {
        Self {
            sample_rate,
            block_size: block_size.max(1),
        }
    }

    /// Rejects sample rates outside `MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE`,
    /// including NaN and infinities.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("sample_rate", self.sample_rate, MIN_SAMPLE_RATE, MAX_SAMPLE_RATE)
    }

    pub fn seconds_to_samples(&self, seconds: f32) -> usize {
        (seconds.max(0.0) * self.sample_rate).round() as usize
    }
}

// karplus_strong.rs

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::noise_shaper::{pick_window, NoiseShaper};

/// Largest fine-tuning a pluck may apply, in either direction.
pub const MAX_DETUNE_CENTS: f32 = 100.0;
/// Largest per-sample decay factor; 1.0 would never fade out.
pub const MAX_DECAY: f32 = 0.999_999;

/// Per-string synthesis parameters. Produced by `GuitarConfig::voice_params`.
#[derive(Clone, Debug, PartialEq)]
pub struct VoiceParams {
    /// Per-sample amplitude multiplier, just below 1.
    pub decay: f32,
    /// Feedback coefficient of the excitation low-pass.
    pub smoothing: f32,
    /// Strings whose pitch sits below this use the three-tap average.
    pub bass_cutoff_hz: f32,
    pub silence_threshold: f32,
    pub pick_position_min: f32,
    pub pick_position_max: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            decay: 0.99997,
            smoothing: 0.5,
            bass_cutoff_hz: 160.0,
            silence_threshold: 1e-4,
            pick_position_min: 0.2,
            pick_position_max: 0.6,
        }
    }
}

/// Number of whole samples in one period of `frequency`, clamped to
/// `1..=capacity`.
///
/// Pitches above the sample rate collapse to a single-sample loop, which
/// buzzes at Nyquist instead of failing.
pub fn delay_line_length(sample_rate: f32, frequency: f32, capacity: usize) -> usize {
    // NaN and negative values cast to 0, infinities saturate.
    ((sample_rate / frequency).floor() as usize).clamp(1, capacity.max(1))
}

/// A single Karplus-Strong string.
///
/// The delay buffer is sized once for the lowest pitch the string can reach
/// and reused by every pluck, so neither `pluck` nor `render_block` allocates.
pub struct StringVoice {
    open_frequency_hz: f32,
    sample_rate: f32,
    buffer: Vec<f32>,
    delay_line_length: usize,
    write_pointer: usize,
    amplitude: f32,
    three_tap_min_length: usize,
    params: VoiceParams,
    shaper: NoiseShaper,
    rng: SmallRng,
}

impl StringVoice {
    pub fn new(open_frequency_hz: f32, sample_rate: f32, params: VoiceParams, seed: u64) -> Self {
        let lowest_hz = open_frequency_hz * 2f32.powf(-MAX_DETUNE_CENTS / 1200.0);
        let capacity = ((sample_rate / lowest_hz).floor() as usize).saturating_add(1);
        let three_tap_min_length = (sample_rate / params.bass_cutoff_hz).floor() as usize;

        StringVoice {
            open_frequency_hz,
            sample_rate,
            buffer: vec![0.0; capacity.max(1)],
            delay_line_length: 0,
            write_pointer: 0,
            amplitude: 0.0,
            three_tap_min_length,
            shaper: NoiseShaper::new(params.smoothing),
            params,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn frequency_for(&self, fret_offset: f32, detune_cents: f32) -> f32 {
        let cents = fret_offset.max(0.0) * 100.0 + clamp_detune(detune_cents);
        self.open_frequency_hz * 2f32.powf(cents / 1200.0)
    }

    /// Re-excites the string. The previous note, if still ringing, is
    /// overwritten from the next rendered sample on.
    pub fn pluck(&mut self, fret_offset: f32, velocity: f32, detune_cents: f32) {
        let frequency = self.frequency_for(fret_offset, detune_cents);
        let length = delay_line_length(self.sample_rate, frequency, self.buffer.len());
        let velocity = if velocity.is_nan() {
            0.0
        } else {
            velocity.clamp(0.0, 1.0)
        };

        let (low, high) = ordered(self.params.pick_position_min, self.params.pick_position_max);
        let pick_position = if high > low {
            self.rng.gen_range(low..high)
        } else {
            low
        };

        // Excitation first, then pointer, then amplitude.
        self.shaper.reset();
        for (i, slot) in self.buffer[..length].iter_mut().enumerate() {
            let white = self.rng.gen::<f32>() * 2.0 - 1.0;
            *slot = pick_window(i, length, pick_position) * self.shaper.process(white) * velocity;
        }
        self.delay_line_length = length;
        self.write_pointer = 0;
        self.amplitude = velocity;
    }

    pub fn damp(&mut self) {
        self.amplitude = 0.0;
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let length = self.delay_line_length;
        if length == 0 || self.amplitude <= self.params.silence_threshold {
            return 0.0;
        }

        let current = self.write_pointer;
        let next = if current + 1 == length { 0 } else { current + 1 };
        let averaged = if length > self.three_tap_min_length {
            let after = if next + 1 == length { 0 } else { next + 1 };
            (self.buffer[current] + self.buffer[next] + self.buffer[after]) / 3.0
        } else {
            (self.buffer[current] + self.buffer[next]) * 0.5
        };

        let sample = averaged * self.amplitude;
        self.buffer[current] = sample;
        self.write_pointer = next;
        self.amplitude *= self.params.decay;
        sample
    }

    /// Overwrites `output` with the next `output.len()` samples.
    pub fn render_block(&mut self, output: &mut [f32]) {
        for sample in output.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Adds the next `output.len()` samples onto `output`.
    pub fn mix_into(&mut self, output: &mut [f32]) {
        for sample in output.iter_mut() {
            *sample += self.next_sample();
        }
    }

    /// Allocating convenience for offline use; not for the audio callback.
    pub fn render(&mut self, sample_count: usize) -> Vec<f32> {
        let mut output = vec![0.0; sample_count];
        self.render_block(&mut output);
        output
    }

    /// Non-finite values are ignored; the rest are clamped to `0..=MAX_DECAY`.
    pub fn set_decay(&mut self, decay: f32) {
        if decay.is_finite() {
            self.params.decay = decay.clamp(0.0, MAX_DECAY);
        }
    }

    pub fn is_sounding(&self) -> bool {
        self.delay_line_length > 0 && self.amplitude > self.params.silence_threshold
    }

    /// 3 for strings pitched below the bass cutoff, 2 otherwise.
    pub fn filter_taps(&self) -> usize {
        if self.delay_line_length > self.three_tap_min_length {
            3
        } else {
            2
        }
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn delay_line_length(&self) -> usize {
        self.delay_line_length
    }

    pub fn delay_line(&self) -> &[f32] {
        &self.buffer[..self.delay_line_length]
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn write_pointer(&self) -> usize {
        self.write_pointer
    }

    pub fn open_frequency_hz(&self) -> f32 {
        self.open_frequency_hz
    }

    pub fn params(&self) -> &VoiceParams {
        &self.params
    }
}

fn clamp_detune(detune_cents: f32) -> f32 {
    if detune_cents.is_finite() {
        detune_cents.clamp(-MAX_DETUNE_CENTS, MAX_DETUNE_CENTS)
    } else {
        0.0
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

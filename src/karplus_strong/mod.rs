pub mod karplus_strong;
pub mod noise_shaper;

#[cfg(test)]
mod karplus_strong_tests;

pub use karplus_strong::{
    delay_line_length, StringVoice, VoiceParams, MAX_DECAY, MAX_DETUNE_CENTS,
};
pub use noise_shaper::NoiseShaper;

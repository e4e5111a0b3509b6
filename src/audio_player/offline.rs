// offline.rs

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::audio_player::AudioContext;
use crate::error::AudioError;
use crate::guitar::GuitarRenderer;

/// Renders `seconds` of mono audio, one context block at a time, exactly as
/// the audio callback would.
pub fn render_offline(
    renderer: &mut GuitarRenderer,
    context: &AudioContext,
    seconds: f32,
) -> Vec<f32> {
    let total = context.seconds_to_samples(seconds);
    let mut samples = vec![0.0f32; total];
    for block in samples.chunks_mut(context.block_size) {
        renderer.render(block);
    }
    samples
}

/// Renders `seconds` of audio to a mono 32-bit float WAV file and returns
/// the number of samples written.
pub fn render_to_wav(
    renderer: &mut GuitarRenderer,
    context: &AudioContext,
    seconds: f32,
    path: impl AsRef<Path>,
) -> Result<usize, AudioError> {
    let path = path.as_ref();
    let spec = WavSpec {
        channels: 1,
        sample_rate: context.sample_rate.round() as u32,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let samples = render_offline(renderer, context, seconds);
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in &samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    log::info!("Wrote {} samples to {}", samples.len(), path.display());
    Ok(samples.len())
}

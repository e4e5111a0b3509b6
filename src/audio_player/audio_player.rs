// audio_player.rs

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, SupportedStreamConfig};

use crate::audio_player::audio_context::{AudioContext, DEFAULT_BLOCK_SIZE};
use crate::error::AudioError;
use crate::guitar::GuitarRenderer;

/// The host's default output device, opened but not yet streaming.
///
/// Build the guitar with [`OutputDevice::context`] so voices are sized for
/// the device's real sample rate, then hand the renderer to
/// [`OutputDevice::start`].
pub struct OutputDevice {
    device: Device,
    config: SupportedStreamConfig,
    context: AudioContext,
}

/// A running output stream. Dropping it stops playback.
pub struct AudioPlayer {
    stream: Stream,
    context: AudioContext,
    channels: usize,
}

impl OutputDevice {
    pub fn default_output() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        let config = device.default_output_config()?;
        let context = AudioContext::new(config.sample_rate().0 as f32, DEFAULT_BLOCK_SIZE);

        log::info!(
            "Output device {} at {} Hz, {} channels, {:?}",
            device.name().unwrap_or_else(|_| "<unnamed>".to_owned()),
            context.sample_rate,
            config.channels(),
            config.sample_format()
        );
        Ok(Self {
            device,
            config,
            context,
        })
    }

    pub fn context(&self) -> AudioContext {
        self.context
    }

    pub fn start(self, mut renderer: GuitarRenderer) -> Result<AudioPlayer, AudioError> {
        let channels = self.config.channels() as usize;
        let stream = match self.config.sample_format() {
            SampleFormat::F32 => self.device.build_output_stream(
                &self.config.config(),
                move |data: &mut [f32], _| write_data(data, channels, &mut renderer),
                |err| log::error!("Stream error: {}", err),
                None,
            )?,
            other => return Err(AudioError::UnsupportedSampleFormat(format!("{:?}", other))),
        };
        stream.play()?;

        Ok(AudioPlayer {
            stream,
            context: self.context,
            channels,
        })
    }
}

impl AudioPlayer {
    pub fn context(&self) -> AudioContext {
        self.context
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn stream(&self) -> &Stream {
        &self.stream
    }
}

/// Fills an interleaved device buffer from the mono renderer.
///
/// The mono block is rendered into the front of `output` and spread out to
/// every channel back to front, so no scratch buffer is needed on the audio
/// thread. A trailing partial frame is zeroed.
pub fn write_data(output: &mut [f32], channels: usize, renderer: &mut GuitarRenderer) {
    if channels == 0 {
        return;
    }
    let frames = output.len() / channels;
    renderer.render(&mut output[..frames]);

    if channels > 1 {
        for frame in (0..frames).rev() {
            let value = output[frame];
            output[frame * channels..(frame + 1) * channels].fill(value);
        }
    }
    output[frames * channels..].fill(0.0);
}

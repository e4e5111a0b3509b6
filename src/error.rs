// error.rs

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VoicingError {
    #[error("chord pitch class {0} is outside 0..=11")]
    ChordPitchClassOutOfRange(u8),
    #[error("tuning pitch class {value} on string {string} is outside 0..=11")]
    TuningPitchClassOutOfRange { string: usize, value: u8 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChordError {
    #[error("scale degree {0} is outside 0..7")]
    DegreeOutOfRange(usize),
    #[error("unrecognized chord: third {third}, fifth {fifth} semitones above the root")]
    UnrecognizedQuality { third: i32, fifth: i32 },
    #[error("unknown chord transform '{0}'")]
    UnknownTransform(String),
    #[error("unknown scale '{0}'")]
    UnknownScale(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be within {min}..={max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("treble smoothing ({treble}) must not exceed bass smoothing ({bass})")]
    SmoothingInverted { bass: f32, treble: f32 },
    #[error("preferred max fret {preferred} exceeds max fret {max}")]
    FretRangeInverted { preferred: u8, max: u8 },
    #[error("unknown guitar preset '{0}'")]
    UnknownPreset(String),
    #[error("could not read config: {0}")]
    Read(String),
}

#[derive(Debug, Error)]
pub enum GuitarError {
    #[error(transparent)]
    Voicing(#[from] VoicingError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("string index {0} is outside 0..6")]
    StringOutOfRange(usize),
    #[error("command queue is full, command dropped")]
    QueueFull,
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no output device available")]
    NoOutputDevice,
    #[error("unsupported sample format {0}")]
    UnsupportedSampleFormat(String),
    #[error(transparent)]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    #[error(transparent)]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error(transparent)]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error(transparent)]
    Wav(#[from] hound::Error),
}

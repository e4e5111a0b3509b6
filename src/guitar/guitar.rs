// guitar.rs

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::guitar::voicing::{DEFAULT_MAX_FRET, DEFAULT_PREFERRED_MAX_FRET};
use crate::karplus_strong::{VoiceParams, MAX_DECAY, MAX_DETUNE_CENTS};
use crate::music_representation::STRING_COUNT;

pub const MAX_CAPO_FRET: u8 = 24;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuitarType {
    Custom,
    Acoustic,
    Classical,
    Electric,
}

impl fmt::Display for GuitarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuitarType::Custom => write!(f, "Custom"),
            GuitarType::Acoustic => write!(f, "Acoustic"),
            GuitarType::Classical => write!(f, "Classical"),
            GuitarType::Electric => write!(f, "Electric"),
        }
    }
}

/// Everything tunable about the instrument. Missing fields in a JSON file
/// fall back to the acoustic preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuitarConfig {
    pub name: GuitarType,
    /// Per-sample amplitude multiplier.
    pub decay: f32,
    /// Excitation low-pass coefficient on the lowest string.
    pub bass_smoothing: f32,
    /// Excitation low-pass coefficient on the highest string.
    pub treble_smoothing: f32,
    /// Pitches below this are damped with the three-tap average.
    pub bass_cutoff_hz: f32,
    pub silence_threshold: f32,
    pub pick_position_min: f32,
    pub pick_position_max: f32,
    /// Random fine-tuning applied per pluck, +/- this many cents.
    pub detune_spread_cents: f32,
    pub capo_fret: u8,
    pub volume: f32,
    /// Seconds between consecutive strings of a strum.
    pub strum_time_unit: f32,
    /// Extra random seconds added to each strum step.
    pub strum_jitter: f32,
    /// Fraction of the velocity a strum may randomly shave off each string.
    pub velocity_jitter: f32,
    pub max_fret: u8,
    pub preferred_max_fret: u8,
}

impl Default for GuitarConfig {
    fn default() -> Self {
        Self::acoustic()
    }
}

impl GuitarConfig {
    pub fn acoustic() -> Self {
        Self {
            name: GuitarType::Acoustic,
            decay: 0.99997,
            bass_smoothing: 0.6,
            treble_smoothing: 0.35,
            bass_cutoff_hz: 160.0,
            silence_threshold: 1e-4,
            pick_position_min: 0.2,
            pick_position_max: 0.6,
            detune_spread_cents: 1.5,
            capo_fret: 0,
            volume: 0.5,
            strum_time_unit: 0.05,
            strum_jitter: 0.005,
            velocity_jitter: 0.1,
            max_fret: DEFAULT_MAX_FRET,
            preferred_max_fret: DEFAULT_PREFERRED_MAX_FRET,
        }
    }

    pub fn classical() -> Self {
        Self {
            name: GuitarType::Classical,
            decay: 0.99994,
            bass_smoothing: 0.7,
            treble_smoothing: 0.5,
            pick_position_min: 0.3,
            pick_position_max: 0.7,
            detune_spread_cents: 1.0,
            strum_time_unit: 0.06,
            ..Self::acoustic()
        }
    }

    pub fn electric() -> Self {
        Self {
            name: GuitarType::Electric,
            decay: 0.99998,
            bass_smoothing: 0.45,
            treble_smoothing: 0.2,
            pick_position_min: 0.1,
            pick_position_max: 0.4,
            detune_spread_cents: 0.5,
            strum_time_unit: 0.03,
            ..Self::acoustic()
        }
    }

    pub fn custom(
        decay: f32,
        bass_smoothing: f32,
        treble_smoothing: f32,
        capo_fret: u8,
        volume: f32,
    ) -> Self {
        let validated_capo_fret = capo_fret.min(MAX_CAPO_FRET);

        GuitarConfig {
            name: GuitarType::Custom,
            decay,
            bass_smoothing,
            treble_smoothing,
            capo_fret: validated_capo_fret,
            volume,
            ..Self::acoustic()
        }
    }

    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "acoustic" => Ok(Self::acoustic()),
            "classical" => Ok(Self::classical()),
            "electric" => Ok(Self::electric()),
            _ => Err(ConfigError::UnknownPreset(name.to_owned())),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GuitarConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Read(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded {} guitar config from {}", config.name, path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_decay(self.decay)?;
        check_range("bass_smoothing", self.bass_smoothing, 0.0, 1.0)?;
        check_range("treble_smoothing", self.treble_smoothing, 0.0, 1.0)?;
        if self.treble_smoothing > self.bass_smoothing {
            return Err(ConfigError::SmoothingInverted {
                bass: self.bass_smoothing,
                treble: self.treble_smoothing,
            });
        }
        check_range("bass_cutoff_hz", self.bass_cutoff_hz, 1.0, 20_000.0)?;
        check_range("silence_threshold", self.silence_threshold, 0.0, 0.5)?;
        check_range("pick_position_min", self.pick_position_min, 0.0, 1.0)?;
        check_range(
            "pick_position_max",
            self.pick_position_max,
            self.pick_position_min,
            1.0,
        )?;
        check_range(
            "detune_spread_cents",
            self.detune_spread_cents,
            0.0,
            MAX_DETUNE_CENTS,
        )?;
        check_range("capo_fret", self.capo_fret as f32, 0.0, MAX_CAPO_FRET as f32)?;
        check_range("volume", self.volume, 0.0, 1.0)?;
        check_range("strum_time_unit", self.strum_time_unit, 0.0, 1.0)?;
        check_range("strum_jitter", self.strum_jitter, 0.0, 1.0)?;
        check_range("velocity_jitter", self.velocity_jitter, 0.0, 1.0)?;
        if self.preferred_max_fret > self.max_fret {
            return Err(ConfigError::FretRangeInverted {
                preferred: self.preferred_max_fret,
                max: self.max_fret,
            });
        }
        Ok(())
    }

    /// Synthesis parameters for one string. Excitation smoothing slides from
    /// the bass value on string 0 to the treble value on the top string.
    pub fn voice_params(&self, string: usize) -> VoiceParams {
        let position = string.min(STRING_COUNT - 1) as f32 / (STRING_COUNT - 1) as f32;
        VoiceParams {
            decay: self.decay,
            smoothing: self.bass_smoothing
                + (self.treble_smoothing - self.bass_smoothing) * position,
            bass_cutoff_hz: self.bass_cutoff_hz,
            silence_threshold: self.silence_threshold,
            pick_position_min: self.pick_position_min,
            pick_position_max: self.pick_position_max,
        }
    }
}

pub(crate) fn check_decay(decay: f32) -> Result<(), ConfigError> {
    check_range("decay", decay, 0.0, MAX_DECAY)
}

pub(crate) fn check_range(
    name: &'static str,
    value: f32,
    min: f32,
    max: f32,
) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

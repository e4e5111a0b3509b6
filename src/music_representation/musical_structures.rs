// musical_structures.rs

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChordError;

pub const DEGREES_PER_SCALE: usize = 7;
pub const STRING_COUNT: usize = 6;

/// Standard EADGBE tuning as MIDI note numbers, low string first.
pub const STANDARD_TUNING_MIDI: [u8; STRING_COUNT] = [40, 45, 50, 55, 59, 64];

pub fn midi_to_hz(midi: f32) -> f32 {
    440.0 * 2f32.powf((midi - 69.0) / 12.0)
}

pub fn pitch_class(semitone: i32) -> u8 {
    semitone.rem_euclid(12) as u8
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuning {
    pub midi: [u8; STRING_COUNT],
}

impl Default for Tuning {
    fn default() -> Self {
        Self::standard()
    }
}

impl Tuning {
    pub fn standard() -> Self {
        Self {
            midi: STANDARD_TUNING_MIDI,
        }
    }

    /// Open-string pitch classes with a capo on `capo_fret`.
    pub fn pitch_classes(&self, capo_fret: u8) -> [u8; STRING_COUNT] {
        self.midi.map(|m| ((m as u16 + capo_fret as u16) % 12) as u8)
    }

    pub fn open_frequencies(&self) -> [f32; STRING_COUNT] {
        self.midi.map(|m| midi_to_hz(m as f32))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleKind {
    Major,
    Minor,
}

impl ScaleKind {
    pub const ALL: [ScaleKind; 2] = [ScaleKind::Major, ScaleKind::Minor];

    /// Semitone offsets of the seven degrees above the scale root.
    pub fn degrees(self) -> [i32; DEGREES_PER_SCALE] {
        match self {
            ScaleKind::Major => [0, 2, 4, 5, 7, 9, 11],
            ScaleKind::Minor => [0, 2, 3, 5, 7, 8, 10],
        }
    }

    /// Scale tone `index` steps above the root, continuing into higher
    /// octaves past the seventh degree.
    pub fn tone(self, index: usize) -> i32 {
        self.degrees()[index % DEGREES_PER_SCALE] + 12 * (index / DEGREES_PER_SCALE) as i32
    }
}

impl fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleKind::Major => write!(f, "Major"),
            ScaleKind::Minor => write!(f, "Minor"),
        }
    }
}

impl FromStr for ScaleKind {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "major" | "maj" => Ok(ScaleKind::Major),
            "minor" | "min" => Ok(ScaleKind::Minor),
            _ => Err(ChordError::UnknownScale(s.to_owned())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
}

impl ChordQuality {
    pub fn from_intervals(third: i32, fifth: i32) -> Result<Self, ChordError> {
        match (third, fifth) {
            (4, 7) => Ok(ChordQuality::Major),
            (3, 7) => Ok(ChordQuality::Minor),
            (3, 6) => Ok(ChordQuality::Diminished),
            (4, 8) => Ok(ChordQuality::Augmented),
            _ => Err(ChordError::UnrecognizedQuality { third, fifth }),
        }
    }
}

impl fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChordQuality::Major => write!(f, "maj"),
            ChordQuality::Minor => write!(f, "min"),
            ChordQuality::Diminished => write!(f, "dim"),
            ChordQuality::Augmented => write!(f, "aug"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordTransform {
    None,
    MajorMinor,
    Seventh,
    ScaleSeventh,
    ScaleNinth,
    Sus4,
    Sus2,
    Diminished,
    Augmented,
}

impl ChordTransform {
    pub const ALL: [ChordTransform; 9] = [
        ChordTransform::None,
        ChordTransform::MajorMinor,
        ChordTransform::Seventh,
        ChordTransform::ScaleSeventh,
        ChordTransform::ScaleNinth,
        ChordTransform::Sus4,
        ChordTransform::Sus2,
        ChordTransform::Diminished,
        ChordTransform::Augmented,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            ChordTransform::None => "None",
            ChordTransform::MajorMinor => "maj/min",
            ChordTransform::Seventh => "7th",
            ChordTransform::ScaleSeventh => "maj/min 7th",
            ChordTransform::ScaleNinth => "maj/min 9th",
            ChordTransform::Sus4 => "sus4",
            ChordTransform::Sus2 => "sus2",
            ChordTransform::Diminished => "dim",
            ChordTransform::Augmented => "aug",
        }
    }

    /// Applies the transform to a chord built on `degree` of `scale`.
    pub fn apply(self, chord: Chord, scale: ScaleKind, degree: usize) -> Chord {
        match self {
            ChordTransform::None => chord,
            ChordTransform::MajorMinor => toggle_major_minor(chord),
            ChordTransform::Seventh => Chord {
                quality: ChordQuality::Major,
                third: chord.root + 4,
                fifth: chord.root + 7,
                seventh: Some(chord.root + 10),
                ..chord
            },
            ChordTransform::ScaleSeventh => Chord {
                seventh: Some(scale.tone(degree + 6)),
                ..chord
            },
            ChordTransform::ScaleNinth => {
                let ninth = match chord.quality {
                    ChordQuality::Major | ChordQuality::Minor => Some(scale.tone(degree + 8)),
                    ChordQuality::Diminished | ChordQuality::Augmented => chord.ninth,
                };
                Chord {
                    seventh: Some(scale.tone(degree + 6)),
                    ninth,
                    ..chord
                }
            }
            ChordTransform::Sus4 => Chord {
                third: chord.root + 5,
                ..chord
            },
            ChordTransform::Sus2 => Chord {
                third: chord.root + 2,
                ..chord
            },
            ChordTransform::Diminished => {
                if chord.quality == ChordQuality::Diminished {
                    Chord {
                        quality: ChordQuality::Minor,
                        third: chord.root + 3,
                        fifth: chord.root + 7,
                        ..chord
                    }
                } else {
                    Chord {
                        quality: ChordQuality::Diminished,
                        third: chord.root + 3,
                        fifth: chord.root + 6,
                        ..chord
                    }
                }
            }
            ChordTransform::Augmented => {
                if chord.quality == ChordQuality::Augmented {
                    Chord {
                        quality: ChordQuality::Major,
                        third: chord.root + 4,
                        fifth: chord.root + 7,
                        ..chord
                    }
                } else {
                    Chord {
                        quality: ChordQuality::Augmented,
                        third: chord.root + 4,
                        fifth: chord.root + 8,
                        ..chord
                    }
                }
            }
        }
    }
}

fn toggle_major_minor(chord: Chord) -> Chord {
    match chord.quality {
        ChordQuality::Major => Chord {
            quality: ChordQuality::Minor,
            third: chord.third - 1,
            ..chord
        },
        ChordQuality::Minor => Chord {
            quality: ChordQuality::Major,
            third: chord.third + 1,
            ..chord
        },
        ChordQuality::Augmented => Chord {
            quality: ChordQuality::Minor,
            third: chord.third - 1,
            fifth: chord.root + 7,
            ..chord
        },
        ChordQuality::Diminished => Chord {
            quality: ChordQuality::Major,
            third: chord.third + 1,
            fifth: chord.root + 7,
            ..chord
        },
    }
}

impl fmt::Display for ChordTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for ChordTransform {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        ChordTransform::ALL
            .into_iter()
            .find(|t| t.tag().eq_ignore_ascii_case(tag))
            .ok_or_else(|| ChordError::UnknownTransform(s.to_owned()))
    }
}

/// A chord as semitone offsets above the scale root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    pub quality: ChordQuality,
    pub root: i32,
    pub third: i32,
    pub fifth: i32,
    pub seventh: Option<i32>,
    pub ninth: Option<i32>,
}

impl Chord {
    /// Stacks thirds on `degree` of `scale`, then applies `transform`.
    pub fn create(
        scale: ScaleKind,
        degree: usize,
        transform: ChordTransform,
    ) -> Result<Chord, ChordError> {
        if degree >= DEGREES_PER_SCALE {
            return Err(ChordError::DegreeOutOfRange(degree));
        }

        let root = scale.tone(degree);
        let third = scale.tone(degree + 2);
        let fifth = scale.tone(degree + 4);
        let quality = ChordQuality::from_intervals(third - root, fifth - root)?;

        let chord = Chord {
            quality,
            root,
            third,
            fifth,
            seventh: None,
            ninth: None,
        };
        Ok(transform.apply(chord, scale, degree))
    }

    pub fn semitones(&self) -> Vec<i32> {
        [Some(self.root), Some(self.third), Some(self.fifth), self.seventh, self.ninth]
            .into_iter()
            .flatten()
            .collect()
    }

    /// Distinct pitch classes in chord-tone order, transposed up by `key`.
    pub fn pitch_classes(&self, key: u8) -> Vec<u8> {
        let mut classes = Vec::with_capacity(5);
        for semitone in self.semitones() {
            let class = pitch_class(semitone + key as i32);
            if !classes.contains(&class) {
                classes.push(class);
            }
        }
        classes
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.quality, self.semitones())
    }
}

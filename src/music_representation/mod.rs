pub mod musical_structures;

#[cfg(test)]
mod musical_structures_tests;

pub use musical_structures::{
    midi_to_hz, pitch_class, Chord, ChordQuality, ChordTransform, ScaleKind, Tuning,
    STANDARD_TUNING_MIDI, STRING_COUNT,
};

// voicing.rs

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::VoicingError;
use crate::music_representation::STRING_COUNT;

pub const DEFAULT_MAX_FRET: u8 = 12;
pub const DEFAULT_PREFERRED_MAX_FRET: u8 = 5;

/// Strings below this index form the bass half of the neck.
const BASS_STRINGS: usize = 3;
/// Distinct chord tones to place before a treble string may add another.
const CORE_TONES: u32 = 3;

/// One entry per string, low string first. `None` is a muted string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FretAssignment(pub [Option<u8>; STRING_COUNT]);

impl FretAssignment {
    pub fn muted() -> Self {
        FretAssignment([None; STRING_COUNT])
    }

    pub fn frets(&self) -> &[Option<u8>; STRING_COUNT] {
        &self.0
    }

    pub fn is_all_muted(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }

    /// `(string, fret)` for every string that sounds.
    pub fn sounding(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(string, fret)| fret.map(|f| (string, f)))
    }
}

impl fmt::Display for FretAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, fret) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match fret {
                Some(fret) => write!(f, "{}", fret)?,
                None => write!(f, "x")?,
            }
        }
        Ok(())
    }
}

fn pitch_class_mask(pitch_classes: &[u8]) -> Result<u16, VoicingError> {
    pitch_classes.iter().try_fold(0u16, |mask, &pc| {
        if pc > 11 {
            Err(VoicingError::ChordPitchClassOutOfRange(pc))
        } else {
            Ok(mask | 1 << pc)
        }
    })
}

/// Maps a set of chord pitch classes onto six strings.
///
/// Strings are voiced low to high, each taking the lowest fret that lands on
/// a chord tone within `preferred_max_fret`. Once three distinct tones sound,
/// a treble string jumps to the first fret (up to `max_fret`) that adds a new
/// tone, while bass strings never introduce one and never reach past
/// `preferred_max_fret`. The result is deterministic; an all-muted assignment
/// is a valid answer when nothing fits.
pub fn compute_frets(
    chord_pitch_classes: &[u8],
    tuning: &[u8; STRING_COUNT],
    max_fret: u8,
    preferred_max_fret: u8,
) -> Result<FretAssignment, VoicingError> {
    let chord = pitch_class_mask(chord_pitch_classes)?;
    if let Some((string, &value)) = tuning.iter().enumerate().find(|&(_, &pc)| pc > 11) {
        return Err(VoicingError::TuningPitchClassOutOfRange { string, value });
    }

    let mut used: u16 = 0;
    let mut frets = [None; STRING_COUNT];

    for (string, &open) in tuning.iter().enumerate() {
        let bass = string < BASS_STRINGS;
        let mut chosen: Option<(u8, u8)> = None;

        for fret in 0..=max_fret {
            let pc = ((open as u16 + fret as u16) % 12) as u8;
            if chord & (1 << pc) == 0 {
                continue;
            }
            let is_new = used & (1 << pc) == 0;
            let extending = is_new && used.count_ones() >= CORE_TONES;

            if extending && bass {
                continue;
            }
            if extending {
                chosen = Some((fret, pc));
                break;
            }
            if chosen.is_none() && fret <= preferred_max_fret {
                chosen = Some((fret, pc));
            }
        }

        if let Some((fret, pc)) = chosen {
            if bass && fret > preferred_max_fret {
                continue;
            }
            used |= 1 << pc;
            frets[string] = Some(fret);
        }
    }

    Ok(FretAssignment(frets))
}

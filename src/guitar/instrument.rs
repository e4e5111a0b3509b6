// instrument.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam::queue::ArrayQueue;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::audio_player::AudioContext;
use crate::error::{ConfigError, GuitarError};
use crate::guitar::guitar::{check_decay, GuitarConfig};
use crate::guitar::voicing::{compute_frets, FretAssignment};
use crate::karplus_strong::StringVoice;
use crate::music_representation::{pitch_class, Chord, Tuning, STRING_COUNT};

pub const COMMAND_QUEUE_CAPACITY: usize = 64;
/// Plucks a single string can have waiting at once.
pub const PENDING_PLUCKS_PER_STRING: usize = 8;

/// Messages from the control side to the renderer.
///
/// Plucks on one string fire in order of their delay. A pluck arriving while
/// the string already has `PENDING_PLUCKS_PER_STRING` waiting is dropped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StringCommand {
    Pluck {
        string: usize,
        fret_offset: f32,
        velocity: f32,
        detune_cents: f32,
        /// Samples to wait, counted from the start of the next block.
        delay_samples: usize,
    },
    SetDecay(f32),
}

/// One note-off flag per string, set by the control side and cleared by the
/// renderer when it silences the string.
#[derive(Debug, Default)]
struct DampFlags([AtomicBool; STRING_COUNT]);

impl DampFlags {
    fn raise(&self, string: usize) {
        self.0[string].store(true, Ordering::Release);
    }

    fn take(&self, string: usize) -> bool {
        self.0[string].swap(false, Ordering::AcqRel)
    }
}

#[derive(Clone, Copy, Debug)]
struct PendingPluck {
    fret_offset: f32,
    velocity: f32,
    detune_cents: f32,
    remaining: usize,
}

/// Control-side handle: voices chords and schedules plucks.
///
/// Never touches a `StringVoice` directly; everything reaches the renderer
/// through a bounded lock-free queue or the damp flags, so nothing here can
/// block the audio callback.
pub struct Guitar {
    config: GuitarConfig,
    tuning: Tuning,
    context: AudioContext,
    commands: Arc<ArrayQueue<StringCommand>>,
    damp_flags: Arc<DampFlags>,
    rng: SmallRng,
}

/// Render-side half, moved into the audio callback.
pub struct GuitarRenderer {
    voices: [StringVoice; STRING_COUNT],
    pending: [[Option<PendingPluck>; PENDING_PLUCKS_PER_STRING]; STRING_COUNT],
    commands: Arc<ArrayQueue<StringCommand>>,
    damp_flags: Arc<DampFlags>,
    volume: f32,
}

impl Guitar {
    pub fn new(
        context: &AudioContext,
        config: GuitarConfig,
        seed: u64,
    ) -> Result<(Guitar, GuitarRenderer), ConfigError> {
        Self::with_tuning(context, config, Tuning::standard(), seed)
    }

    pub fn with_tuning(
        context: &AudioContext,
        config: GuitarConfig,
        tuning: Tuning,
        seed: u64,
    ) -> Result<(Guitar, GuitarRenderer), ConfigError> {
        config.validate()?;
        context.validate()?;

        let commands = Arc::new(ArrayQueue::new(COMMAND_QUEUE_CAPACITY));
        let damp_flags = Arc::new(DampFlags::default());
        let open_frequencies = tuning.open_frequencies();
        let voices = std::array::from_fn(|string| {
            StringVoice::new(
                open_frequencies[string],
                context.sample_rate,
                config.voice_params(string),
                seed.wrapping_add(string as u64 + 1),
            )
        });

        log::info!(
            "{} guitar ready at {} Hz, capo {}",
            config.name,
            context.sample_rate,
            config.capo_fret
        );

        let renderer = GuitarRenderer {
            voices,
            pending: [[None; PENDING_PLUCKS_PER_STRING]; STRING_COUNT],
            commands: Arc::clone(&commands),
            damp_flags: Arc::clone(&damp_flags),
            volume: config.volume,
        };
        let guitar = Guitar {
            config,
            tuning,
            context: *context,
            commands,
            damp_flags,
            rng: SmallRng::seed_from_u64(seed),
        };
        Ok((guitar, renderer))
    }

    pub fn config(&self) -> &GuitarConfig {
        &self.config
    }

    /// Fret assignment for a pitch-class set, with the capo applied to the
    /// tuning. Frets are counted from the capo.
    pub fn voicing(&self, pitch_classes: &[u8]) -> Result<FretAssignment, GuitarError> {
        let assignment = compute_frets(
            pitch_classes,
            &self.tuning.pitch_classes(self.config.capo_fret),
            self.config.max_fret,
            self.config.preferred_max_fret,
        )?;
        Ok(assignment)
    }

    /// Voices the pitch classes and strums them low string to high.
    ///
    /// Returns the voicing used. An all-muted voicing plays nothing. When the
    /// queue cannot take the whole strum, no string is queued.
    pub fn strum_pitch_classes(
        &mut self,
        pitch_classes: &[u8],
        velocity: f32,
    ) -> Result<FretAssignment, GuitarError> {
        let assignment = self.voicing(pitch_classes)?;
        if assignment.is_all_muted() {
            log::debug!("No voicing for {:?}, strum suppressed", pitch_classes);
            return Ok(assignment);
        }
        let strings = assignment.sounding().count();
        let free = self.commands.capacity().saturating_sub(self.commands.len());
        if free < strings {
            log::warn!(
                "Command queue has room for {} of {} plucks, dropping strum",
                free,
                strings
            );
            return Err(GuitarError::QueueFull);
        }
        log::debug!("Strumming {:?} as {}", pitch_classes, assignment);

        let mut strum_time = 0.0f32;
        for (string, fret) in assignment.frets().iter().enumerate() {
            if let Some(fret) = *fret {
                let shave = self.rng.gen::<f32>() * self.config.velocity_jitter;
                let detune = self.random_detune();
                self.push(StringCommand::Pluck {
                    string,
                    fret_offset: fret as f32 + self.config.capo_fret as f32,
                    velocity: velocity * (1.0 - shave),
                    detune_cents: detune,
                    delay_samples: self.context.seconds_to_samples(strum_time),
                })?;
            }
            // Muted strings still take their slot in the strum.
            strum_time +=
                self.config.strum_time_unit + self.rng.gen::<f32>() * self.config.strum_jitter;
        }
        Ok(assignment)
    }

    /// Strums chord semitones (relative to the scale root) transposed by `key`.
    pub fn strum_semitones(
        &mut self,
        semitones: &[i32],
        key: u8,
        velocity: f32,
    ) -> Result<FretAssignment, GuitarError> {
        let mut pitch_classes: Vec<u8> = Vec::with_capacity(semitones.len());
        for &semitone in semitones {
            let pc = pitch_class(semitone + key as i32);
            if !pitch_classes.contains(&pc) {
                pitch_classes.push(pc);
            }
        }
        self.strum_pitch_classes(&pitch_classes, velocity)
    }

    pub fn strum_chord(
        &mut self,
        chord: &Chord,
        key: u8,
        velocity: f32,
    ) -> Result<FretAssignment, GuitarError> {
        self.strum_pitch_classes(&chord.pitch_classes(key), velocity)
    }

    /// Plucks one string at `fret` (counted from the capo) after
    /// `delay_samples`.
    pub fn pluck_string(
        &mut self,
        string: usize,
        fret: u8,
        velocity: f32,
        delay_samples: usize,
    ) -> Result<(), GuitarError> {
        if string >= STRING_COUNT {
            return Err(GuitarError::StringOutOfRange(string));
        }
        let detune = self.random_detune();
        self.push(StringCommand::Pluck {
            string,
            fret_offset: fret as f32 + self.config.capo_fret as f32,
            velocity,
            detune_cents: detune,
            delay_samples,
        })
    }

    /// Decay outside `0..=MAX_DECAY` (or NaN) is rejected before anything
    /// reaches the renderer.
    pub fn set_decay(&mut self, decay: f32) -> Result<(), GuitarError> {
        check_decay(decay)?;
        self.push(StringCommand::SetDecay(decay))?;
        self.config.decay = decay;
        Ok(())
    }

    pub fn damp_string(&self, string: usize) -> Result<(), GuitarError> {
        if string >= STRING_COUNT {
            return Err(GuitarError::StringOutOfRange(string));
        }
        self.damp_flags.raise(string);
        Ok(())
    }

    /// Silences every string, including plucks still waiting in a strum.
    pub fn damp_all(&self) {
        for string in 0..STRING_COUNT {
            self.damp_flags.raise(string);
        }
    }

    fn random_detune(&mut self) -> f32 {
        let spread = self.config.detune_spread_cents;
        if spread > 0.0 {
            self.rng.gen_range(-spread..=spread)
        } else {
            0.0
        }
    }

    fn push(&self, command: StringCommand) -> Result<(), GuitarError> {
        self.commands.push(command).map_err(|rejected| {
            log::warn!("Command queue full, dropping {:?}", rejected);
            GuitarError::QueueFull
        })
    }
}

impl GuitarRenderer {
    /// Fills `output` with the next mono block.
    ///
    /// Runs on the audio thread: it pops the queue, reads atomics and walks
    /// preallocated buffers, and never allocates, locks or logs. Damp flags
    /// are honoured before newly queued plucks, so a note-off followed by a
    /// fresh strum still sounds the new strum.
    pub fn render(&mut self, output: &mut [f32]) {
        if output.is_empty() {
            return;
        }

        for (string, voice) in self.voices.iter_mut().enumerate() {
            if self.damp_flags.take(string) {
                voice.damp();
                self.pending[string] = [None; PENDING_PLUCKS_PER_STRING];
            }
        }

        while let Some(command) = self.commands.pop() {
            match command {
                StringCommand::Pluck {
                    string,
                    fret_offset,
                    velocity,
                    detune_cents,
                    delay_samples,
                } => {
                    let free_slot = self
                        .pending
                        .get_mut(string)
                        .and_then(|slots| slots.iter_mut().find(|slot| slot.is_none()));
                    if let Some(slot) = free_slot {
                        *slot = Some(PendingPluck {
                            fret_offset,
                            velocity,
                            detune_cents,
                            remaining: delay_samples,
                        });
                    }
                }
                StringCommand::SetDecay(decay) => {
                    for voice in self.voices.iter_mut() {
                        voice.set_decay(decay);
                    }
                }
            }
        }

        output.fill(0.0);
        let length = output.len();
        for (voice, slots) in self.voices.iter_mut().zip(self.pending.iter_mut()) {
            let mut cursor = 0;
            while let Some(index) = next_due(slots, length) {
                if let Some(pluck) = slots[index].take() {
                    voice.mix_into(&mut output[cursor..pluck.remaining]);
                    voice.pluck(pluck.fret_offset, pluck.velocity, pluck.detune_cents);
                    cursor = pluck.remaining;
                }
            }
            voice.mix_into(&mut output[cursor..]);

            for pluck in slots.iter_mut().flatten() {
                pluck.remaining -= length;
            }
        }

        for sample in output.iter_mut() {
            *sample = (*sample * self.volume).clamp(-1.0, 1.0);
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn is_sounding(&self) -> bool {
        self.voices.iter().any(StringVoice::is_sounding)
            || self.pending.iter().flatten().any(Option::is_some)
    }

    pub fn voices(&self) -> &[StringVoice; STRING_COUNT] {
        &self.voices
    }
}

/// Slot of the earliest pluck due within a block of `length` samples.
fn next_due(slots: &[Option<PendingPluck>], length: usize) -> Option<usize> {
    slots
        .iter()
        .enumerate()
        .filter_map(|(index, slot)| slot.map(|pluck| (index, pluck.remaining)))
        .filter(|&(_, remaining)| remaining < length)
        .min_by_key(|&(_, remaining)| remaining)
        .map(|(index, _)| index)
}

// main.rs

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use chordstrum::audio_player::{render_to_wav, AudioContext, OutputDevice};
use chordstrum::guitar::{Guitar, GuitarConfig};
use chordstrum::music_representation::{Chord, ChordTransform, ScaleKind};

/// Strums one chord on a plucked-string guitar.
#[derive(Parser, Debug)]
#[clap(author, about, long_about = None)]
struct Args {
    /// Scale the chord is built from: major or minor
    #[clap(long, default_value = "major")]
    scale: ScaleKind,

    /// Scale degree of the chord root, 0 to 6
    #[clap(short, long, default_value_t = 0)]
    degree: usize,

    /// Chord transform tag, e.g. "7th", "sus4", "maj/min 9th"
    #[clap(short, long, default_value = "None")]
    transform: ChordTransform,

    /// Key as a pitch class, 0 = C
    #[clap(short, long, default_value_t = 0)]
    key: u8,

    #[clap(long, default_value_t = 0.9)]
    velocity: f32,

    /// acoustic, classical or electric
    #[clap(short, long, default_value = "acoustic")]
    preset: String,

    /// JSON guitar config; overrides --preset
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// How long to let the chord ring, up to ten minutes
    #[clap(short, long, default_value_t = 4.0, value_parser = parse_seconds)]
    seconds: f32,

    /// Render to this WAV file instead of the sound card
    #[clap(long)]
    wav: Option<PathBuf>,

    /// Sample rate for WAV rendering
    #[clap(long, default_value_t = 44100.0)]
    sample_rate: f32,

    #[clap(long, default_value_t = 1)]
    seed: u64,
}

const MAX_SECONDS: f32 = 600.0;

fn parse_seconds(arg: &str) -> Result<f32, String> {
    let seconds: f32 = arg.parse().map_err(|e| format!("{}", e))?;
    if (0.0..=MAX_SECONDS).contains(&seconds) {
        Ok(seconds)
    } else {
        Err(format!("must be between 0 and {} seconds", MAX_SECONDS))
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let chord = Chord::create(args.scale, args.degree, args.transform)?;
    let config = match &args.config {
        Some(path) => GuitarConfig::from_json_file(path)?,
        None => GuitarConfig::preset(&args.preset)?,
    };
    log::info!(
        "{} degree {} ({}) in key {}: {}",
        args.scale,
        args.degree,
        args.transform,
        args.key,
        chord
    );

    match &args.wav {
        Some(path) => {
            let context = AudioContext::new(args.sample_rate, 256);
            let (mut guitar, mut renderer) = Guitar::new(&context, config, args.seed)?;
            let voicing = guitar.strum_chord(&chord, args.key, args.velocity)?;
            println!("{}", voicing);
            render_to_wav(&mut renderer, &context, args.seconds, path)
                .with_context(|| format!("rendering to {}", path.display()))?;
        }
        None => {
            let device = OutputDevice::default_output()?;
            let (mut guitar, renderer) = Guitar::new(&device.context(), config, args.seed)?;
            let _player = device.start(renderer)?;
            let voicing = guitar.strum_chord(&chord, args.key, args.velocity)?;
            println!("{}", voicing);
            thread::sleep(Duration::from_secs_f32(args.seconds));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{parse_seconds, Args};

    #[test]
    fn test_seconds_must_be_finite_and_bounded() {
        assert_eq!(parse_seconds("2.5"), Ok(2.5));
        assert_eq!(parse_seconds("0"), Ok(0.0));
        for bad in ["inf", "NaN", "-1", "1e30", "soon"] {
            assert!(parse_seconds(bad).is_err(), "{bad}");
        }

        assert!(Args::try_parse_from(["chordstrum", "--seconds", "inf"]).is_err());
        let args = Args::try_parse_from(["chordstrum", "-s", "3"]).unwrap();
        assert_eq!(args.seconds, 3.0);
    }
}

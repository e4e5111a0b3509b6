#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::error::ChordError;
    use crate::music_representation::musical_structures::{
        midi_to_hz, pitch_class, Chord, ChordQuality, ChordTransform, ScaleKind, Tuning,
    };

    const MAJOR_SCALE_CHORDS: [[i32; 3]; 7] = [
        [0, 4, 7],
        [2, 5, 9],
        [4, 7, 11],
        [5, 9, 12],
        [7, 11, 14],
        [9, 12, 16],
        [11, 14, 17],
    ];

    const MINOR_SCALE_CHORDS: [[i32; 3]; 7] = [
        [0, 3, 7],
        [2, 5, 8],
        [3, 7, 10],
        [5, 8, 12],
        [7, 10, 14],
        [8, 12, 15],
        [10, 14, 17],
    ];

    fn chord(scale: ScaleKind, degree: usize, transform: ChordTransform) -> Chord {
        Chord::create(scale, degree, transform).unwrap()
    }

    #[test]
    fn test_diatonic_triads() {
        for (scale, table) in [
            (ScaleKind::Major, MAJOR_SCALE_CHORDS),
            (ScaleKind::Minor, MINOR_SCALE_CHORDS),
        ] {
            for (degree, expected) in table.iter().enumerate() {
                let triad = chord(scale, degree, ChordTransform::None);
                assert_eq!(triad.semitones(), expected.to_vec(), "{scale} degree {degree}");
            }
        }
    }

    #[test]
    fn test_diatonic_qualities() {
        let major: Vec<ChordQuality> = (0..7)
            .map(|d| chord(ScaleKind::Major, d, ChordTransform::None).quality)
            .collect();
        assert_eq!(
            major,
            vec![
                ChordQuality::Major,
                ChordQuality::Minor,
                ChordQuality::Minor,
                ChordQuality::Major,
                ChordQuality::Major,
                ChordQuality::Minor,
                ChordQuality::Diminished,
            ]
        );
        assert_eq!(
            chord(ScaleKind::Minor, 1, ChordTransform::None).quality,
            ChordQuality::Diminished
        );
    }

    #[test]
    fn test_degree_out_of_range() {
        assert_eq!(
            Chord::create(ScaleKind::Major, 7, ChordTransform::None),
            Err(ChordError::DegreeOutOfRange(7))
        );
    }

    #[test]
    fn test_unrecognized_quality() {
        assert!(matches!(
            ChordQuality::from_intervals(2, 7),
            Err(ChordError::UnrecognizedQuality { third: 2, fifth: 7 })
        ));
    }

    #[test]
    fn test_major_minor_toggle() {
        let minor = chord(ScaleKind::Major, 0, ChordTransform::MajorMinor);
        assert_eq!(minor.quality, ChordQuality::Minor);
        assert_eq!(minor.semitones(), vec![0, 3, 7]);

        let major = chord(ScaleKind::Major, 1, ChordTransform::MajorMinor);
        assert_eq!(major.quality, ChordQuality::Major);
        assert_eq!(major.semitones(), vec![2, 6, 9]);

        // vii° flips to a major triad with a perfect fifth.
        let from_dim = chord(ScaleKind::Major, 6, ChordTransform::MajorMinor);
        assert_eq!(from_dim.quality, ChordQuality::Major);
        assert_eq!(from_dim.semitones(), vec![11, 15, 18]);
    }

    #[test]
    fn test_dominant_seventh_overrides_quality() {
        let dominant = chord(ScaleKind::Major, 6, ChordTransform::Seventh);
        assert_eq!(dominant.quality, ChordQuality::Major);
        assert_eq!(dominant.semitones(), vec![11, 15, 18, 21]);
    }

    #[test]
    fn test_scale_seventh_and_ninth() {
        let maj7 = chord(ScaleKind::Major, 0, ChordTransform::ScaleSeventh);
        assert_eq!(maj7.semitones(), vec![0, 4, 7, 11]);

        let min9 = chord(ScaleKind::Major, 1, ChordTransform::ScaleNinth);
        assert_eq!(min9.semitones(), vec![2, 5, 9, 12, 16]);

        // Diminished chords take the seventh but no ninth.
        let half_dim = chord(ScaleKind::Major, 6, ChordTransform::ScaleNinth);
        assert_eq!(half_dim.semitones(), vec![11, 14, 17, 21]);
    }

    #[test]
    fn test_suspended() {
        assert_eq!(chord(ScaleKind::Major, 0, ChordTransform::Sus4).semitones(), vec![0, 5, 7]);
        assert_eq!(chord(ScaleKind::Minor, 0, ChordTransform::Sus2).semitones(), vec![0, 2, 7]);
    }

    #[test]
    fn test_diminished_and_augmented_toggle() {
        let dim = chord(ScaleKind::Major, 0, ChordTransform::Diminished);
        assert_eq!(dim.quality, ChordQuality::Diminished);
        assert_eq!(dim.semitones(), vec![0, 3, 6]);

        let back_to_minor = chord(ScaleKind::Major, 6, ChordTransform::Diminished);
        assert_eq!(back_to_minor.quality, ChordQuality::Minor);
        assert_eq!(back_to_minor.semitones(), vec![11, 14, 18]);

        let aug = chord(ScaleKind::Minor, 0, ChordTransform::Augmented);
        assert_eq!(aug.quality, ChordQuality::Augmented);
        assert_eq!(aug.semitones(), vec![0, 4, 8]);

        let twice = ChordTransform::Augmented.apply(aug, ScaleKind::Minor, 0);
        assert_eq!(twice.quality, ChordQuality::Major);
        assert_eq!(twice.semitones(), vec![0, 4, 7]);
    }

    #[test]
    fn test_pitch_classes_transpose_and_dedupe() {
        let c_major = chord(ScaleKind::Major, 0, ChordTransform::None);
        assert_eq!(c_major.pitch_classes(0), vec![0, 4, 7]);
        assert_eq!(c_major.pitch_classes(7), vec![7, 11, 2]);

        let doubled = Chord {
            seventh: Some(12),
            ..c_major
        };
        assert_eq!(doubled.pitch_classes(0), vec![0, 4, 7]);
        assert_eq!(pitch_class(-1), 11);
    }

    #[test]
    fn test_parse_transform_tags() {
        for transform in ChordTransform::ALL {
            assert_eq!(transform.tag().parse::<ChordTransform>(), Ok(transform));
        }
        assert_eq!(
            "MAJ/MIN 9TH".parse::<ChordTransform>(),
            Ok(ChordTransform::ScaleNinth)
        );
        assert_eq!(
            "13th".parse::<ChordTransform>(),
            Err(ChordError::UnknownTransform("13th".to_owned()))
        );
        assert_eq!("Minor".parse::<ScaleKind>(), Ok(ScaleKind::Minor));
        assert!("lydian".parse::<ScaleKind>().is_err());
    }

    #[test]
    fn test_midi_to_hz() {
        assert_abs_diff_eq!(midi_to_hz(69.0), 440.0);
        assert_abs_diff_eq!(midi_to_hz(40.0), 82.406_89, epsilon = 1e-3);
        assert_abs_diff_eq!(midi_to_hz(64.0), 329.627_56, epsilon = 1e-3);
    }

    #[test]
    fn test_tuning_pitch_classes() {
        let tuning = Tuning::standard();
        assert_eq!(tuning.pitch_classes(0), [4, 9, 2, 7, 11, 4]);
        assert_eq!(tuning.pitch_classes(2), [6, 11, 4, 9, 1, 6]);
        assert!(tuning
            .open_frequencies()
            .windows(2)
            .all(|pair| pair[0] < pair[1]));
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use crate::karplus_strong::karplus_strong::{
        delay_line_length, StringVoice, VoiceParams, MAX_DECAY,
    };
    use crate::karplus_strong::noise_shaper::{pick_window, NoiseShaper};

    const SAMPLE_RATE: f32 = 44100.0;
    const LOW_E_HZ: f32 = 82.406_89;
    const HIGH_E_HZ: f32 = 329.627_56;

    fn fast_decay() -> VoiceParams {
        VoiceParams {
            decay: 0.999,
            ..VoiceParams::default()
        }
    }

    #[test]
    fn test_silent_before_any_pluck() {
        let mut voice = StringVoice::new(LOW_E_HZ, SAMPLE_RATE, VoiceParams::default(), 1);
        let output = voice.render(512);
        assert_eq!(output.len(), 512);
        assert!(output.iter().all(|&s| s == 0.0));
        assert!(!voice.is_sounding());
    }

    #[test]
    fn test_empty_block_has_no_side_effects() {
        let mut voice = StringVoice::new(LOW_E_HZ, SAMPLE_RATE, VoiceParams::default(), 1);
        voice.pluck(0.0, 0.8, 0.0);
        let amplitude = voice.amplitude();
        let pointer = voice.write_pointer();

        voice.render_block(&mut []);
        assert!(voice.render(0).is_empty());
        assert_eq!(voice.amplitude(), amplitude);
        assert_eq!(voice.write_pointer(), pointer);
    }

    #[test]
    fn test_octave_halves_delay_line() {
        let mut voice = StringVoice::new(LOW_E_HZ, SAMPLE_RATE, VoiceParams::default(), 7);
        voice.pluck(0.0, 1.0, 0.0);
        let open = voice.delay_line_length();
        voice.pluck(12.0, 1.0, 0.0);
        let octave = voice.delay_line_length();

        assert_eq!(open, 535);
        assert!((octave as f32 - open as f32 / 2.0).abs() <= 1.0);
    }

    #[test]
    fn test_detune_cents_match_frets() {
        let mut voice = StringVoice::new(HIGH_E_HZ, SAMPLE_RATE, VoiceParams::default(), 7);
        voice.pluck(1.0, 1.0, 0.0);
        let by_fret = voice.delay_line_length();
        voice.pluck(0.0, 1.0, 100.0);
        assert_eq!(voice.delay_line_length(), by_fret);

        assert_abs_diff_eq!(voice.frequency_for(12.0, 0.0), HIGH_E_HZ * 2.0, epsilon = 1e-2);
    }

    #[test]
    fn test_degenerate_pitch_clamps_to_one_sample() {
        assert_eq!(delay_line_length(SAMPLE_RATE, 64_000.0, 100), 1);
        assert_eq!(delay_line_length(SAMPLE_RATE, f32::INFINITY, 100), 1);
        assert_eq!(delay_line_length(SAMPLE_RATE, 0.0, 100), 100);
        assert_eq!(delay_line_length(SAMPLE_RATE, f32::NAN, 100), 1);

        let mut voice = StringVoice::new(1000.0, SAMPLE_RATE, fast_decay(), 3);
        voice.pluck(72.0, 1.0, 0.0);
        assert_eq!(voice.delay_line_length(), 1);
        let output = voice.render(256);
        assert!(output.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_delay_line_never_exceeds_capacity() {
        let mut voice = StringVoice::new(LOW_E_HZ, SAMPLE_RATE, VoiceParams::default(), 3);
        voice.pluck(0.0, 1.0, -1000.0);
        assert!(voice.delay_line_length() <= voice.capacity());
        voice.pluck(-5.0, 1.0, -100.0);
        assert!(voice.delay_line_length() <= voice.capacity());
    }

    #[test]
    fn test_amplitude_decays_monotonically() {
        let mut voice = StringVoice::new(LOW_E_HZ, SAMPLE_RATE, fast_decay(), 11);
        voice.pluck(3.0, 0.9, 0.0);
        assert_abs_diff_eq!(voice.amplitude(), 0.9);

        let mut block = [0.0f32; 256];
        let mut previous = voice.amplitude();
        for _ in 0..64 {
            voice.render_block(&mut block);
            let current = voice.amplitude();
            assert!(current <= previous, "amplitude rose from {previous} to {current}");
            previous = current;
        }
        assert!(previous <= voice.params().silence_threshold);
    }

    #[test]
    fn test_silence_after_threshold() {
        let mut voice = StringVoice::new(HIGH_E_HZ, SAMPLE_RATE, fast_decay(), 5);
        voice.pluck(0.0, 1.0, 0.0);

        let mut block = [0.0f32; 128];
        while voice.is_sounding() {
            voice.render_block(&mut block);
        }
        for _ in 0..8 {
            voice.render_block(&mut block);
            assert!(block.iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn test_damp_silences_next_sample() {
        let mut voice = StringVoice::new(LOW_E_HZ, SAMPLE_RATE, VoiceParams::default(), 9);
        voice.pluck(5.0, 1.0, 0.0);
        let ringing = voice.render(256);
        assert!(ringing.iter().any(|&s| s != 0.0));

        voice.damp();
        let damped = voice.render(256);
        assert!(damped.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_restrike_while_ringing() {
        let mut voice = StringVoice::new(LOW_E_HZ, SAMPLE_RATE, fast_decay(), 13);
        voice.pluck(0.0, 1.0, 0.0);
        voice.render(1000);
        assert!(voice.amplitude() < 1.0);

        voice.pluck(7.0, 0.5, 0.0);
        assert_abs_diff_eq!(voice.amplitude(), 0.5);
        assert_eq!(voice.write_pointer(), 0);
        assert_eq!(voice.delay_line_length(), 357);
        assert!(voice.render(64).iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_feedback_is_scaled_by_amplitude() {
        let mut voice = StringVoice::new(HIGH_E_HZ, SAMPLE_RATE, VoiceParams::default(), 21);
        voice.pluck(0.0, 0.5, 0.0);
        assert_eq!(voice.filter_taps(), 2);
        let before = voice.delay_line().to_vec();
        let length = before.len();

        let output = voice.render(length);
        let after = voice.delay_line();

        // First sample: both taps are still the excitation.
        let expected = (before[0] + before[1]) * 0.5 * 0.5;
        assert_abs_diff_eq!(output[0], expected, epsilon = 1e-7);
        assert_abs_diff_eq!(after[0], expected, epsilon = 1e-7);

        // Over one period every slot holds exactly what was emitted from it.
        for (written, emitted) in after.iter().zip(output.iter()) {
            assert_eq!(written, emitted);
        }
    }

    #[test]
    fn test_set_decay_rejects_non_finite_and_caps() {
        let mut voice = StringVoice::new(LOW_E_HZ, SAMPLE_RATE, VoiceParams::default(), 1);
        voice.set_decay(f32::NAN);
        assert_abs_diff_eq!(voice.params().decay, VoiceParams::default().decay);
        voice.set_decay(f32::INFINITY);
        assert_abs_diff_eq!(voice.params().decay, VoiceParams::default().decay);

        voice.set_decay(1.0);
        assert_abs_diff_eq!(voice.params().decay, MAX_DECAY);
        voice.set_decay(0.998);
        assert_abs_diff_eq!(voice.params().decay, 0.998);

        voice.pluck(0.0, 1.0, 0.0);
        assert!(voice.render(4096).iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_excitation_bounded_by_velocity() {
        let mut voice = StringVoice::new(LOW_E_HZ, SAMPLE_RATE, VoiceParams::default(), 17);
        voice.pluck(0.0, 0.4, 0.0);
        assert!(voice.delay_line().iter().all(|s| s.abs() <= 0.4 + 1e-6));
        assert!(voice.delay_line().iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_bass_strings_use_three_taps() {
        let mut low = StringVoice::new(LOW_E_HZ, SAMPLE_RATE, VoiceParams::default(), 1);
        let mut high = StringVoice::new(HIGH_E_HZ, SAMPLE_RATE, VoiceParams::default(), 1);
        low.pluck(0.0, 1.0, 0.0);
        high.pluck(0.0, 1.0, 0.0);
        assert_eq!(low.filter_taps(), 3);
        assert_eq!(high.filter_taps(), 2);

        // Fretting the low string up past the cutoff switches it to two taps.
        low.pluck(12.0, 1.0, 0.0);
        assert_eq!(low.filter_taps(), 2);
    }

    #[test]
    fn test_same_seed_same_output() {
        let mut a = StringVoice::new(HIGH_E_HZ, SAMPLE_RATE, VoiceParams::default(), 42);
        let mut b = StringVoice::new(HIGH_E_HZ, SAMPLE_RATE, VoiceParams::default(), 42);
        a.pluck(2.0, 0.7, 3.0);
        b.pluck(2.0, 0.7, 3.0);
        assert_eq!(a.render(1024), b.render(1024));
    }

    #[test]
    fn test_heavier_smoothing_is_less_noisy() {
        let mut rng = SmallRng::seed_from_u64(99);
        let white: Vec<f32> = (0..4096).map(|_| rng.gen::<f32>() * 2.0 - 1.0).collect();

        let roughness = |smoothing: f32| {
            let mut shaper = NoiseShaper::new(smoothing);
            let shaped: Vec<f32> = white.iter().map(|&w| shaper.process(w)).collect();
            shaped.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f32>()
        };

        assert!(roughness(0.7) < roughness(0.3));
        assert!(roughness(0.3) < roughness(0.0));
    }

    #[test]
    fn test_noise_shaper_reset() {
        let mut shaper = NoiseShaper::new(0.5);
        assert_abs_diff_eq!(shaper.process(1.0), 0.5);
        assert_abs_diff_eq!(shaper.process(1.0), 0.75);
        shaper.reset();
        assert_abs_diff_eq!(shaper.process(1.0), 0.5);
        assert_abs_diff_eq!(NoiseShaper::new(3.0).smoothing(), 1.0);
    }

    #[test]
    fn test_pick_window_shape() {
        assert_abs_diff_eq!(pick_window(10, 100, 0.0), 1.0);
        assert!(pick_window(0, 100, 1.0) < 0.05);
        assert_abs_diff_eq!(pick_window(50, 101, 1.0), 1.0, epsilon = 1e-4);
        assert_eq!(pick_window(0, 0, 0.5), 0.0);
    }
}

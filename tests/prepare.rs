use approx::assert_abs_diff_eq;
use ndarray::Array2;
use std::f32::consts::PI;
use tempfile::tempdir;

use stem_runner::core::prepare::{prepare, PAD_SECONDS, TARGET_SAMPLE_RATE};
use stem_runner::{write_audio, PrepareOptions, RunnerError, Waveform};

fn sine_wave(channels: usize, frames: usize, sample_rate: u32) -> Waveform {
    let samples = Array2::from_shape_fn((channels, frames), |(ch, i)| {
        let t = i as f32 / sample_rate as f32;
        (2.0 * PI * (220.0 + 110.0 * ch as f32) * t).sin() * 0.3
    });
    Waveform::new(samples, sample_rate)
}

fn no_pad() -> PrepareOptions {
    PrepareOptions {
        stereo_narrowing: 0,
        pad_tail: false,
    }
}

#[test]
fn pads_five_seconds_and_records_original_len() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("in.wav");
    let frames = 8000;
    write_audio(&path, &sine_wave(2, frames, TARGET_SAMPLE_RATE)).unwrap();

    let opts = PrepareOptions {
        stereo_narrowing: 0,
        pad_tail: true,
    };
    let prepared = prepare(&path, &opts).unwrap();

    let pad = PAD_SECONDS * TARGET_SAMPLE_RATE as usize;
    assert_eq!(prepared.original_len, frames);
    assert_eq!(prepared.mixture.len(), frames + pad);
    // The tail really is silence.
    for i in frames..frames + pad {
        assert_eq!(prepared.mixture.samples[[0, i]], 0.0);
        assert_eq!(prepared.mixture.samples[[1, i]], 0.0);
    }
}

#[test]
fn mono_input_is_duplicated_to_stereo() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("mono.wav");
    write_audio(&path, &sine_wave(1, 4000, TARGET_SAMPLE_RATE)).unwrap();

    let prepared = prepare(&path, &no_pad()).unwrap();

    assert_eq!(prepared.mixture.channels(), 2);
    for i in 0..prepared.mixture.len() {
        assert_abs_diff_eq!(
            prepared.mixture.samples[[0, i]],
            prepared.mixture.samples[[1, i]],
            epsilon = 0.0
        );
    }
}

#[test]
fn narrowing_is_skipped_for_mono_input() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("mono.wav");
    write_audio(&path, &sine_wave(1, 4000, TARGET_SAMPLE_RATE)).unwrap();

    let opts = PrepareOptions {
        stereo_narrowing: 40,
        pad_tail: false,
    };
    let prepared = prepare(&path, &opts).unwrap();

    // Duplicated-mono never gets the stereo transform.
    assert_eq!(prepared.narrowing, 0);
    for i in 0..prepared.mixture.len() {
        assert_abs_diff_eq!(
            prepared.mixture.samples[[0, i]],
            prepared.mixture.samples[[1, i]],
            epsilon = 0.0
        );
    }
}

#[test]
fn narrowing_is_applied_to_stereo_input() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("stereo.wav");
    let wave = sine_wave(2, 4000, TARGET_SAMPLE_RATE);
    write_audio(&path, &wave).unwrap();

    let opts = PrepareOptions {
        stereo_narrowing: 40,
        pad_tail: false,
    };
    let prepared = prepare(&path, &opts).unwrap();

    assert_eq!(prepared.narrowing, 40);
    let mut changed = false;
    for i in 0..prepared.mixture.len() {
        if (prepared.mixture.samples[[0, i]] - wave.samples[[0, i]]).abs() > 1e-6 {
            changed = true;
            break;
        }
    }
    assert!(changed, "stereo input was not narrowed");
}

#[test]
fn resamples_to_the_model_rate() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("slow.wav");
    let frames = 22_050;
    write_audio(&path, &sine_wave(2, frames, 22_050)).unwrap();

    let prepared = prepare(&path, &no_pad()).unwrap();

    assert_eq!(prepared.mixture.sample_rate, TARGET_SAMPLE_RATE);
    // Doubling the rate exactly doubles the sample count.
    assert_eq!(prepared.mixture.len(), frames * 2);
}

#[test]
fn undecodable_file_is_an_unreadable_audio_error() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("broken.wav");
    std::fs::write(&path, b"definitely not a wav file").unwrap();

    let err = prepare(&path, &no_pad()).unwrap_err();
    assert!(matches!(err, RunnerError::UnreadableAudio { .. }));
}

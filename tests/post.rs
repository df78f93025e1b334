use approx::assert_abs_diff_eq;
use ndarray::Array2;

use stem_runner::core::post::{finalize, instrumental, truncate};
use stem_runner::core::prepare::PreparedWaveform;
use stem_runner::core::stereo;
use stem_runner::{PostOptions, Waveform};

fn ramp_wave(frames: usize) -> Waveform {
    let samples = Array2::from_shape_fn((2, frames), |(ch, i)| {
        (i as f32 * 0.001) * if ch == 0 { 1.0 } else { -0.5 }
    });
    Waveform::new(samples, 44_100)
}

fn prepared_from(wave: &Waveform, original_len: usize, narrowing: i32) -> PreparedWaveform {
    PreparedWaveform {
        mixture: wave.clone(),
        original_len,
        narrowing,
    }
}

#[test]
fn truncation_restores_the_pre_padding_count() {
    let original_len = 3000;
    let mut stem = ramp_wave(original_len + 2205);
    truncate(&mut stem, original_len);
    assert_eq!(stem.len(), original_len);
    assert_eq!(stem.channels(), 2);
}

#[test]
fn truncation_is_a_no_op_for_short_stems() {
    let mut stem = ramp_wave(100);
    truncate(&mut stem, 500);
    assert_eq!(stem.len(), 100);
}

#[test]
fn finalize_undoes_narrowing_and_padding() {
    let original = ramp_wave(2000);

    // Simulate the preparer: narrow, then pad the tail.
    let mut mixture = original.clone();
    stereo::narrow(&mut mixture, 35);
    let mut padded = Array2::zeros((2, 2000 + 441));
    padded
        .slice_mut(ndarray::s![.., ..2000])
        .assign(&mixture.samples);
    let mut stem = Waveform::new(padded, 44_100);

    let prepared = prepared_from(&stem, 2000, 35);
    let opts = PostOptions {
        truncate_padding: true,
        reverse_width: true,
    };
    finalize(&mut stem, &prepared, &opts).unwrap();

    assert_eq!(stem.len(), 2000);
    for i in 0..stem.len() {
        assert_abs_diff_eq!(stem.samples[[0, i]], original.samples[[0, i]], epsilon = 1e-5);
        assert_abs_diff_eq!(stem.samples[[1, i]], original.samples[[1, i]], epsilon = 1e-5);
    }
}

#[test]
fn finalize_with_batch_options_leaves_the_stem_alone() {
    let mut stem = ramp_wave(2441);
    let before = stem.clone();
    let prepared = prepared_from(&stem, 2000, 0);
    let opts = PostOptions {
        truncate_padding: false,
        reverse_width: false,
    };
    finalize(&mut stem, &prepared, &opts).unwrap();
    assert_eq!(stem.len(), before.len());
    assert_eq!(stem.samples, before.samples);
}

#[test]
fn instrumental_is_mixture_minus_vocals() {
    let mixture = ramp_wave(1500);
    let vocals = Waveform::new(&mixture.samples * 0.25, mixture.sample_rate);

    let inst = instrumental(&mixture, &vocals).unwrap();

    assert_eq!(inst.samples.shape(), mixture.samples.shape());
    assert_eq!(inst.sample_rate, mixture.sample_rate);
    for i in 0..inst.len() {
        assert_abs_diff_eq!(
            inst.samples[[0, i]],
            mixture.samples[[0, i]] * 0.75,
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(
            inst.samples[[1, i]],
            mixture.samples[[1, i]] * 0.75,
            epsilon = 1e-6
        );
    }
}

#[test]
fn instrumental_rejects_misaligned_buffers() {
    let mixture = ramp_wave(1500);
    let vocals = ramp_wave(1400);
    assert!(instrumental(&mixture, &vocals).is_err());
}

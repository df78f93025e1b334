//! Turns a file path into a model-ready mixture.

use anyhow::anyhow;
use ndarray::{s, Array2};
use tracing::debug;

use crate::audio;
use crate::core::stereo;
use crate::error::Result;
use crate::types::{PrepareOptions, Waveform};

/// Fixed model rate; everything is resampled here on load.
pub const TARGET_SAMPLE_RATE: u32 = 44_100;

/// Trailing silence appended before inference to keep separation-model edge
/// artifacts out of the audible tail.
pub const PAD_SECONDS: usize = 5;

/// A mixture ready for the engine, plus what post-processing needs to undo.
#[derive(Clone, Debug)]
pub struct PreparedWaveform {
    pub mixture: Waveform,
    /// Sample count before tail padding.
    pub original_len: usize,
    /// Narrowing that was actually applied (0 when disabled or mono input).
    pub narrowing: i32,
}

/// Load, channel-normalize and pad a waveform for inference.
pub fn prepare(path: &std::path::Path, opts: &PrepareOptions) -> Result<PreparedWaveform> {
    let mut wave = audio::read_audio(path)?;
    if wave.sample_rate != TARGET_SAMPLE_RATE {
        wave = audio::resample(&wave, TARGET_SAMPLE_RATE)?;
    }

    // Narrowing only makes sense for input that was stereo on disk, not for
    // mono we are about to duplicate.
    let genuinely_stereo = wave.is_stereo();

    match wave.channels() {
        1 => {
            let row = wave.samples.row(0).to_owned();
            let mut stereo = Array2::zeros((2, wave.len()));
            stereo.row_mut(0).assign(&row);
            stereo.row_mut(1).assign(&row);
            wave.samples = stereo;
            debug!("duplicated mono input to stereo");
        }
        2 => {}
        n => return Err(anyhow!("Unsupported channel layout: {n} channels").into()),
    }

    let narrowing = if opts.stereo_narrowing != 0 && genuinely_stereo {
        stereo::narrow(&mut wave, opts.stereo_narrowing);
        opts.stereo_narrowing
    } else {
        0
    };

    let original_len = wave.len();
    if opts.pad_tail {
        let pad = PAD_SECONDS * TARGET_SAMPLE_RATE as usize;
        let mut padded = Array2::zeros((wave.channels(), original_len + pad));
        padded
            .slice_mut(s![.., ..original_len])
            .assign(&wave.samples);
        wave.samples = padded;
        debug!("appended {PAD_SECONDS}s of tail silence ({pad} samples)");
    }

    Ok(PreparedWaveform {
        mixture: wave,
        original_len,
        narrowing,
    })
}

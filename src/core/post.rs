//! Undoes preparation on separated stems and derives extra ones.

use anyhow::anyhow;
use ndarray::s;

use crate::core::prepare::PreparedWaveform;
use crate::core::stereo;
use crate::error::Result;
use crate::types::{PostOptions, Waveform};

/// Slice a stem back to the pre-padding sample count.
pub fn truncate(stem: &mut Waveform, original_len: usize) {
    if stem.len() > original_len {
        stem.samples = stem.samples.slice(s![.., ..original_len]).to_owned();
    }
}

/// Apply the configured post steps to one stem: truncation first, then the
/// width reversal matching whatever narrowing the preparer applied.
pub fn finalize(stem: &mut Waveform, prepared: &PreparedWaveform, opts: &PostOptions) -> Result<()> {
    if opts.truncate_padding {
        truncate(stem, prepared.original_len);
    }
    if opts.reverse_width && prepared.narrowing != 0 {
        stereo::widen(stem, prepared.narrowing)?;
    }
    Ok(())
}

/// Derive the instrumental stem: mixture minus vocals, sample for sample.
///
/// The mixture must be the un-narrowed, un-padded one so the subtraction is
/// aligned with what the vocals were separated from.
pub fn instrumental(mixture: &Waveform, vocals: &Waveform) -> Result<Waveform> {
    if mixture.samples.shape() != vocals.samples.shape() {
        return Err(anyhow!(
            "Instrumental derivation needs aligned buffers: mixture {:?} vs vocals {:?}",
            mixture.samples.shape(),
            vocals.samples.shape()
        )
        .into());
    }
    Ok(Waveform::new(
        &mixture.samples - &vocals.samples,
        mixture.sample_rate,
    ))
}

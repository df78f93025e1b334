//! Invertible stereo-field narrowing and widening.
//!
//! `widen(narrow(w, v), v)` recovers `w` for every parameter except the full
//! collapse `v = 100`, where the widening denominator reaches zero. That value
//! is rejected up front by [`validate_width`].

use crate::error::{Result, RunnerError};
use crate::types::Waveform;

/// Narrowing parameter that collapses the image to mono.
pub const FULL_COLLAPSE: i32 = 100;

/// Reject the degenerate narrowing parameter at configuration time so the
/// widening pass never divides by zero mid-run. Values past full collapse in
/// either direction are nonsense (they invert channels) and are rejected too.
pub fn validate_width(value: i32) -> Result<()> {
    if value == FULL_COLLAPSE {
        return Err(RunnerError::DegenerateStereoWidth { value });
    }
    if !(-FULL_COLLAPSE..=FULL_COLLAPSE).contains(&value) {
        return Err(RunnerError::Config(format!(
            "stereo narrowing must be between -100 and 100, got {value}"
        )));
    }
    Ok(())
}

/// Mix both channels toward mono by `value` (0 = identity).
///
/// Both outputs depend on both original inputs, so the left channel is
/// snapshotted before either row is overwritten.
pub fn narrow(wave: &mut Waveform, value: i32) {
    if value == 0 || !wave.is_stereo() {
        return;
    }

    let n = (100 - value) as f32;
    let k1 = (50.0 + n / 2.0) / 100.0;
    let k2 = (50.0 - n / 2.0) / 100.0;

    let left0 = wave.samples.row(0).to_owned();
    for i in 0..wave.len() {
        let l = left0[i];
        let r = wave.samples[[1, i]];
        wave.samples[[0, i]] = k1 * l + k2 * r;
        wave.samples[[1, i]] = k1 * r + k2 * l;
    }
}

/// Exact inverse of [`narrow`] for the same `value`.
pub fn widen(wave: &mut Waveform, value: i32) -> Result<()> {
    if value == 0 || !wave.is_stereo() {
        return Ok(());
    }
    validate_width(value)?;

    let n = (100 - value) as f32 / 100.0;
    let k1 = 0.5 + n / 2.0;
    let k2 = 0.5 - n / 2.0;

    let left0 = wave.samples.row(0).to_owned();
    for i in 0..wave.len() {
        let l = left0[i];
        let r = wave.samples[[1, i]];
        wave.samples[[0, i]] = (k1 * l - k2 * r) / n;
        wave.samples[[1, i]] = (k1 * r - k2 * l) / n;
    }
    Ok(())
}

use ndarray::Array2;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Planar audio buffer, channels x samples, with the sample rate carried
/// alongside. Amplitudes are nominally in [-1, 1] but never clamped.
#[derive(Clone, Debug)]
pub struct Waveform {
    pub samples: Array2<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Array2<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn channels(&self) -> usize {
        self.samples.shape()[0]
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.samples.shape()[1]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_stereo(&self) -> bool {
        self.channels() == 2
    }
}

/// Separated stems keyed by instrument name; iteration order comes from the
/// active instrument list, not from the map.
pub type StemSet = HashMap<String, Waveform>;

/// Pre-inference steps, spelled out per run instead of being hard-coded into
/// one mode.
#[derive(Clone, Debug)]
pub struct PrepareOptions {
    /// Narrowing parameter, 0 disables. Applied only to genuinely stereo input.
    pub stereo_narrowing: i32,
    /// Append five seconds of trailing silence before inference.
    pub pad_tail: bool,
}

/// Post-inference steps. Single-file runs enable both; folder runs disable
/// both, matching the original driver (see DESIGN.md).
#[derive(Clone, Debug)]
pub struct PostOptions {
    /// Slice each stem back to the pre-padding sample count.
    pub truncate_padding: bool,
    /// Undo the input narrowing on each stem before writing.
    pub reverse_width: bool,
}

/// Immutable per-file configuration for one separation run.
#[derive(Clone, Debug)]
pub struct RunRequest {
    pub input: PathBuf,
    pub store_dir: PathBuf,
    pub extract_instrumental: bool,
    pub prepare: PrepareOptions,
    pub post: PostOptions,
}

impl RunRequest {
    /// Single-file defaults: pad the tail, truncate it back, restore width.
    pub fn single_file(
        input: impl Into<PathBuf>,
        store_dir: impl Into<PathBuf>,
        stereo_narrowing: i32,
    ) -> Self {
        Self {
            input: input.into(),
            store_dir: store_dir.into(),
            extract_instrumental: false,
            prepare: PrepareOptions {
                stereo_narrowing,
                pad_tail: true,
            },
            post: PostOptions {
                truncate_padding: true,
                reverse_width: true,
            },
        }
    }

    /// Folder-item defaults: no padding, no narrowing, raw engine output.
    pub fn batch_item(input: impl Into<PathBuf>, store_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            store_dir: store_dir.into(),
            extract_instrumental: false,
            prepare: PrepareOptions {
                stereo_narrowing: 0,
                pad_tail: false,
            },
            post: PostOptions {
                truncate_padding: false,
                reverse_width: false,
            },
        }
    }
}

/// Configuration for a whole folder run. Per-file requests are stamped out
/// from the `prepare`/`post` templates.
#[derive(Clone, Debug)]
pub struct BatchRequest {
    pub input_dir: PathBuf,
    pub store_dir: PathBuf,
    pub extract_instrumental: bool,
    pub prepare: PrepareOptions,
    pub post: PostOptions,
}

impl BatchRequest {
    pub fn folder(input_dir: impl Into<PathBuf>, store_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            store_dir: store_dir.into(),
            extract_instrumental: false,
            prepare: PrepareOptions {
                stereo_narrowing: 0,
                pad_tail: false,
            },
            post: PostOptions {
                truncate_padding: false,
                reverse_width: false,
            },
        }
    }

    pub fn with_instrumental(mut self, extract: bool) -> Self {
        self.extract_instrumental = extract;
        self
    }
}

/// Outcome of a single-file run.
#[derive(Debug)]
pub struct RunReport {
    pub written: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// Outcome of a folder run.
#[derive(Debug)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub elapsed: Duration,
}

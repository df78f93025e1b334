//! # stem-runner
//!
//! Inference driver for audio source-separation models: loads a waveform,
//! prepares it for a separation backend, reassembles the returned stems and
//! writes them back to disk, one file at a time or over a whole folder.

pub mod audio;
pub mod config;
pub mod core;
pub mod error;
pub mod types;

#[cfg(feature = "engine-mock")]
pub use crate::core::engine::PassthroughEngine;
pub use crate::{
    audio::{read_audio, stem_path, write_audio},
    config::{ModelType, SeparationConfig},
    core::device::{DeviceHandle, DeviceKind, DeviceSelector},
    core::engine::{build_engine, ModelSpec, SeparationEngine, SeparationStrategy},
    core::prepare::{PreparedWaveform, PAD_SECONDS, TARGET_SAMPLE_RATE},
    core::runner::{BatchRunner, RunStage, SingleFileRunner},
    error::{Result, RunnerError},
    types::{
        BatchReport, BatchRequest, PostOptions, PrepareOptions, RunReport, RunRequest, StemSet,
        Waveform,
    },
};

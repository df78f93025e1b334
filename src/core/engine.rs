//! Contract between the pipeline and the neural backends.
//!
//! The driver never looks inside a model: it hands a prepared mixture and a
//! device handle to [`SeparationEngine::separate`] and gets back time-aligned
//! stems. Real backends live outside this crate; the `engine-mock` feature
//! compiles a passthrough backend so the runners can be exercised end to end.

use std::path::PathBuf;

use crate::config::{ModelType, SeparationConfig};
use crate::core::device::DeviceHandle;
use crate::error::Result;
use crate::types::{StemSet, Waveform};

/// How a backend windows the mixture and reassembles stems. Picked once from
/// the model tag, never recomputed mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeparationStrategy {
    /// Generic chunked forward pass with overlap-add reconstruction.
    ChunkOverlapAdd,
    /// The htdemucs family brings its own windowing.
    DemucsWindowed,
}

impl SeparationStrategy {
    pub fn for_model(model_type: ModelType) -> Self {
        if model_type.is_demucs_family() {
            SeparationStrategy::DemucsWindowed
        } else {
            SeparationStrategy::ChunkOverlapAdd
        }
    }
}

/// Everything a backend needs to materialize a model. The checkpoint is
/// loaded by the backend; htdemucs checkpoints may wrap their weights under a
/// `"state"` key, which the backend unwraps before applying.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub model_type: ModelType,
    pub config: SeparationConfig,
    pub checkpoint: Option<PathBuf>,
}

/// Maps a prepared mixture to a stem per configured instrument, each with the
/// input's sample count and sample rate.
pub trait SeparationEngine {
    fn separate(&self, mixture: &Waveform, device: &DeviceHandle) -> Result<StemSet>;

    /// Whether this backend can drive an accelerator at all; gates the device
    /// fallback warning at startup.
    fn supports_accelerator(&self) -> bool {
        false
    }
}

#[cfg(feature = "engine-mock")]
pub fn build_engine(spec: &ModelSpec) -> Result<Box<dyn SeparationEngine>> {
    Ok(Box::new(PassthroughEngine::from_spec(spec)))
}

#[cfg(not(feature = "engine-mock"))]
pub fn build_engine(spec: &ModelSpec) -> Result<Box<dyn SeparationEngine>> {
    Err(crate::error::RunnerError::Engine(format!(
        "no separation backend compiled for model type `{:?}`; \
         rebuild with a backend or the `engine-mock` feature",
        spec.model_type
    )))
}

/// Backend stand-in: each stem is the mixture at a per-stem gain, so shapes,
/// rates and derived-stem arithmetic stay meaningful without a real model.
#[cfg(feature = "engine-mock")]
pub struct PassthroughEngine {
    instruments: Vec<String>,
    strategy: SeparationStrategy,
}

#[cfg(feature = "engine-mock")]
impl PassthroughEngine {
    pub fn from_spec(spec: &ModelSpec) -> Self {
        Self {
            instruments: spec.config.active_instruments(),
            strategy: SeparationStrategy::for_model(spec.model_type),
        }
    }
}

#[cfg(feature = "engine-mock")]
impl SeparationEngine for PassthroughEngine {
    fn separate(&self, mixture: &Waveform, _device: &DeviceHandle) -> Result<StemSet> {
        tracing::debug!(strategy = ?self.strategy, "passthrough separate");
        let mut stems = StemSet::new();
        for (i, name) in self.instruments.iter().enumerate() {
            let gain = 1.0 / (i as f32 + 1.0);
            stems.insert(
                name.clone(),
                Waveform::new(&mixture.samples * gain, mixture.sample_rate),
            );
        }
        Ok(stems)
    }
}

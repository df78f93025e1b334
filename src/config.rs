use crate::error::{Result, RunnerError};
use anyhow::Context;
use serde::Deserialize;
use std::{fs, path::Path};

/// Architecture tag for the model a run drives. The separation strategy is
/// derived from this once at startup (htdemucs uses its own windowing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModelType {
    #[value(name = "mdx23c")]
    Mdx23c,
    #[value(name = "htdemucs")]
    Htdemucs,
    #[value(name = "segm_models")]
    SegmModels,
    #[value(name = "mel_band_roformer")]
    MelBandRoformer,
    #[value(name = "bs_roformer")]
    BsRoformer,
    #[value(name = "swin_upernet")]
    SwinUpernet,
    #[value(name = "bandit")]
    Bandit,
}

impl ModelType {
    pub fn is_demucs_family(self) -> bool {
        matches!(self, ModelType::Htdemucs)
    }
}

/// Separation config loaded from the model's YAML file. Only the training
/// section matters to the driver; the rest belongs to the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct SeparationConfig {
    pub training: TrainingSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrainingSection {
    /// Ordered list of stem names the model emits.
    pub instruments: Vec<String>,
    /// Narrows the run to a single stem when set.
    #[serde(default)]
    pub target_instrument: Option<String>,
}

impl SeparationConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: SeparationConfig = serde_yaml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.training.instruments.is_empty() {
            return Err(RunnerError::Config("instrument list is empty".into()));
        }
        if let Some(target) = &self.training.target_instrument {
            if !self.training.instruments.contains(target) {
                return Err(RunnerError::Config(format!(
                    "target instrument `{target}` is not in the instrument list"
                )));
            }
        }
        Ok(())
    }

    /// The stems this run actually produces: the target instrument alone when
    /// one is configured, otherwise the full list.
    pub fn active_instruments(&self) -> Vec<String> {
        match &self.training.target_instrument {
            Some(target) => vec![target.clone()],
            None => self.training.instruments.clone(),
        }
    }
}

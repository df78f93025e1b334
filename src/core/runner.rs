//! Single-file and folder orchestration on top of the leaf stages.

use std::{
    fs,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::audio;
use crate::config::SeparationConfig;
use crate::core::device::DeviceHandle;
use crate::core::engine::SeparationEngine;
use crate::core::post;
use crate::core::prepare::{self, PreparedWaveform};
use crate::core::stereo;
use crate::error::{Result, RunnerError};
use crate::types::{
    BatchReport, BatchRequest, PostOptions, RunReport, RunRequest, StemSet, Waveform,
};

/// How long to wait before rechecking a missing input file. Tolerates the
/// producer still flushing the file when we are invoked on it.
const RECHECK_DELAY: Duration = Duration::from_secs(1);

/// Progression of a single-file run. `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    Validating,
    Preparing,
    Separating,
    PostProcessing,
    Writing,
    Done,
    Failed,
}

/// Drives one file end to end: validate, prepare, separate, post-process,
/// write. Errors propagate to the caller after being logged; there are no
/// retries beyond the one existence recheck.
pub struct SingleFileRunner<'a> {
    engine: &'a dyn SeparationEngine,
    device: &'a DeviceHandle,
    instruments: Vec<String>,
    stage: RunStage,
}

impl<'a> SingleFileRunner<'a> {
    pub fn new(
        engine: &'a dyn SeparationEngine,
        device: &'a DeviceHandle,
        config: &SeparationConfig,
    ) -> Self {
        Self {
            engine,
            device,
            instruments: config.active_instruments(),
            stage: RunStage::Idle,
        }
    }

    pub fn stage(&self) -> RunStage {
        self.stage
    }

    fn advance(&mut self, next: RunStage) {
        debug!(from = ?self.stage, to = ?next, "run stage");
        self.stage = next;
    }

    pub fn run(&mut self, request: &RunRequest) -> Result<RunReport> {
        let started = Instant::now();
        match self.run_stages(request) {
            Ok(written) => {
                self.advance(RunStage::Done);
                let elapsed = started.elapsed();
                info!(
                    "separated {} in {:.2} sec",
                    request.input.display(),
                    elapsed.as_secs_f64()
                );
                Ok(RunReport { written, elapsed })
            }
            Err(e) => {
                error!("run failed for {}: {e}", request.input.display());
                self.stage = RunStage::Failed;
                Err(e)
            }
        }
    }

    fn run_stages(&mut self, request: &RunRequest) -> Result<Vec<PathBuf>> {
        self.advance(RunStage::Validating);
        stereo::validate_width(request.prepare.stereo_narrowing)?;
        if !request.input.is_file() {
            debug!("input missing, rechecking after {RECHECK_DELAY:?}");
            thread::sleep(RECHECK_DELAY);
            if !request.input.is_file() {
                return Err(RunnerError::UnreadableAudio {
                    path: request.input.clone(),
                    reason: "input file does not exist".into(),
                });
            }
        }
        if request.extract_instrumental {
            warn!("instrumental extraction applies to folder runs only; skipping");
        }

        self.advance(RunStage::Preparing);
        let prepared = prepare::prepare(&request.input, &request.prepare)?;

        self.advance(RunStage::Separating);
        let mut stems = self.engine.separate(&prepared.mixture, self.device)?;

        self.advance(RunStage::PostProcessing);
        let finalized = finalize_stems(&mut stems, &self.instruments, &prepared, &request.post)?;

        self.advance(RunStage::Writing);
        write_stems(&finalized, &request.input, &request.store_dir)
    }
}

/// Iterates a folder, applying the single-file stages per entry with full
/// fault isolation: one bad file is logged and skipped, never fatal.
pub struct BatchRunner<'a> {
    engine: &'a dyn SeparationEngine,
    device: &'a DeviceHandle,
    instruments: Vec<String>,
    quiet: bool,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        engine: &'a dyn SeparationEngine,
        device: &'a DeviceHandle,
        config: &SeparationConfig,
    ) -> Self {
        Self {
            engine,
            device,
            instruments: config.active_instruments(),
            quiet: false,
        }
    }

    /// Suppress the progress bar for non-interactive runs.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn run(&self, request: &BatchRequest) -> Result<BatchReport> {
        let started = Instant::now();
        let files = enumerate_inputs(&request.input_dir)?;
        info!("total files found: {}", files.len());

        let bar = if self.quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(files.len() as u64)
        };
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );

        let mut succeeded = 0usize;
        let mut skipped = 0usize;
        for path in &files {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                bar.set_message(name.to_string());
            }
            let item = RunRequest {
                input: path.clone(),
                store_dir: request.store_dir.clone(),
                extract_instrumental: request.extract_instrumental,
                prepare: request.prepare.clone(),
                post: request.post.clone(),
            };
            match self.process_item(&item) {
                Ok(written) => {
                    debug!("wrote {} stems for {}", written.len(), path.display());
                    succeeded += 1;
                }
                Err(e) => {
                    warn!("skipping {}: {e}", path.display());
                    skipped += 1;
                }
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        let elapsed = started.elapsed();
        info!("elapsed time: {:.2} sec", elapsed.as_secs_f64());
        Ok(BatchReport {
            total: files.len(),
            succeeded,
            skipped,
            elapsed,
        })
    }

    fn process_item(&self, request: &RunRequest) -> Result<Vec<PathBuf>> {
        let prepared = prepare::prepare(&request.input, &request.prepare)?;
        let mut stems = self.engine.separate(&prepared.mixture, self.device)?;

        // Derived before any truncation or widening so the subtraction stays
        // aligned with the raw mixture.
        let instrumental = if request.extract_instrumental
            && self.instruments.iter().any(|i| i == "vocals")
        {
            let vocals = stems
                .get("vocals")
                .ok_or_else(|| anyhow!("engine returned no `vocals` stem"))?;
            Some(post::instrumental(&prepared.mixture, vocals)?)
        } else {
            None
        };

        let mut finalized =
            finalize_stems(&mut stems, &self.instruments, &prepared, &request.post)?;
        if let Some(inst) = instrumental {
            finalized.push(("instrumental".into(), inst));
        }
        write_stems(&finalized, &request.input, &request.store_dir)
    }
}

/// Regular files in the directory, one level deep, with an extension (the
/// original driver globbed `*.*`). Sorted so the processing order is stable
/// within a run.
fn enumerate_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(anyhow!("Input folder does not exist: {}", dir.display()).into());
    }
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && e.path().extension().is_some())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    Ok(files)
}

fn finalize_stems(
    stems: &mut StemSet,
    instruments: &[String],
    prepared: &PreparedWaveform,
    opts: &PostOptions,
) -> Result<Vec<(String, Waveform)>> {
    instruments
        .iter()
        .map(|name| {
            let mut stem = stems
                .remove(name)
                .ok_or_else(|| anyhow!("engine returned no `{name}` stem"))?;
            post::finalize(&mut stem, prepared, opts)?;
            Ok((name.clone(), stem))
        })
        .collect()
}

fn write_stems(
    stems: &[(String, Waveform)],
    input: &Path,
    store_dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(store_dir)
        .with_context(|| format!("Failed to create output dir: {}", store_dir.display()))?;

    let mut written = Vec::with_capacity(stems.len());
    for (name, stem) in stems {
        let path = audio::stem_path(store_dir, input, name);
        audio::write_audio(&path, stem)?;
        debug!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

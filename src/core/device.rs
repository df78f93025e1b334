//! Resolves the user's device ids into one concrete handle at startup.

use tracing::warn;

use crate::error::RunnerError;

/// What the user asked for on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    Single(usize),
    Multi(Vec<usize>),
}

impl DeviceSelector {
    pub fn from_ids(ids: &[usize]) -> Self {
        match ids {
            [] => DeviceSelector::Single(0),
            [id] => DeviceSelector::Single(*id),
            many => DeviceSelector::Multi(many.to_vec()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Cpu,
    Accelerator(usize),
}

/// Concrete handle passed opaquely to the engine. `data_parallel` carries the
/// extra device ids when a multi-device strategy was requested; the engine
/// decides what to do with them.
#[derive(Debug, Clone)]
pub struct DeviceHandle {
    pub kind: DeviceKind,
    pub data_parallel: Option<Vec<usize>>,
}

impl DeviceHandle {
    pub fn cpu() -> Self {
        Self {
            kind: DeviceKind::Cpu,
            data_parallel: None,
        }
    }
}

/// Resolve a selector once, before any file is touched. A missing accelerator
/// is a warning, not a failure: the run falls back to the CPU.
pub fn resolve(selector: &DeviceSelector, accelerator_available: bool) -> DeviceHandle {
    if !accelerator_available {
        let id = match selector {
            DeviceSelector::Single(id) => *id,
            DeviceSelector::Multi(ids) => ids.first().copied().unwrap_or(0),
        };
        let unavailable = RunnerError::DeviceUnavailable { id };
        warn!("{unavailable}; running inference on CPU instead (this will be slow)");
        return DeviceHandle::cpu();
    }

    match selector {
        DeviceSelector::Single(id) => DeviceHandle {
            kind: DeviceKind::Accelerator(*id),
            data_parallel: None,
        },
        DeviceSelector::Multi(ids) if ids.is_empty() => DeviceHandle::cpu(),
        DeviceSelector::Multi(ids) => DeviceHandle {
            kind: DeviceKind::Accelerator(ids[0]),
            data_parallel: Some(ids.clone()),
        },
    }
}

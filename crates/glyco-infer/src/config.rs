//! Runtime configuration.
//!
//! The compute device is an explicit value handed to every operation; nothing in
//! the crate selects a device behind the caller's back.
use crate::correction::BackgroundCorrection;
use crate::error::Result;
use candle_core::utils::{cuda_is_available, metal_is_available};
use candle_core::Device;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Which device to run models on.
///
/// Serialized as `"cpu"`, `"auto"`, `{"cuda": 0}` or `{"metal": 0}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceChoice {
    #[default]
    Cpu,
    Auto,
    Cuda(usize),
    Metal(usize),
}

impl DeviceChoice {
    pub fn device(&self) -> Result<Device> {
        match *self {
            DeviceChoice::Cpu => Ok(Device::Cpu),
            DeviceChoice::Auto => device(false),
            DeviceChoice::Cuda(ordinal) => Ok(Device::new_cuda(ordinal)?),
            DeviceChoice::Metal(ordinal) => Ok(Device::new_metal(ordinal)?),
        }
    }
}

/// Picks the best available device, or the CPU when `cpu` is set.
pub fn device(cpu: bool) -> Result<Device> {
    if cpu {
        Ok(Device::Cpu)
    } else if cuda_is_available() {
        Ok(Device::new_cuda(0)?)
    } else if metal_is_available() {
        Ok(Device::new_metal(0)?)
    } else {
        #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
        {
            info!("Running on CPU, to run on GPU(metal), build with `--features metal`");
        }
        #[cfg(not(all(target_os = "macos", target_arch = "aarch64")))]
        {
            info!("Running on CPU, to run on GPU, build with `--features cuda`");
        }
        Ok(Device::Cpu)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceConfig {
    #[serde(default)]
    pub device: DeviceChoice,
    /// CSV with `motif` and `pred` columns; the bundled table is used when unset.
    #[serde(default)]
    pub background_correction: Option<PathBuf>,
}

impl InferenceConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn device(&self) -> Result<Device> {
        self.device.device()
    }

    pub fn load_background_correction(&self) -> Result<BackgroundCorrection> {
        match &self.background_correction {
            Some(path) => BackgroundCorrection::from_csv_path(path),
            None => Ok(BackgroundCorrection::bundled()?.clone()),
        }
    }
}

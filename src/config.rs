//! Demo configuration
//!
//! Sources, lowest priority first:
//! 1. `config/default.toml`
//! 2. `config/user.toml`
//! 3. Environment variables (`RADIAL_SECTION__KEY`)

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use radial_slice::{AngleSpec, OutputSize, Processor, SliceConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Configuration error: {0}")]
pub struct ConfigError(#[from] figment::Error);

/// Defaults live here only; `config/default.toml` lists the keys commented out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub angles: AngleSpec,
    pub slicing: SliceConfig,
    pub volume: VolumeConfig,
    pub output: OutputConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            angles: AngleSpec::default(),
            // depth samples follow the output width, so it must not exceed
            // the volume depth
            slicing: SliceConfig {
                output_size: OutputSize::new(128, 128),
                processor: Processor::Parallel,
                ..SliceConfig::default()
            },
            volume: VolumeConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Shape of the generated test volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    pub depth: usize,
    pub height: usize,
    pub width: usize,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            depth: 128,
            height: 128,
            width: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for PNG previews; `None` skips writing them.
    pub directory: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: Some(PathBuf::from("slices")),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let mut figment = Figment::new();

        for name in ["default.toml", "user.toml"] {
            let path = config_dir.join(name);
            if path.exists() {
                figment = figment.merge(Toml::file(&path));
            }
        }

        // RADIAL_SLICING__PROCESSOR=parallel -> slicing.processor = "parallel"
        figment = figment.merge(Env::prefixed("RADIAL_").split("__"));

        Ok(figment.extract()?)
    }
}

use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSimulationConfig {
    pub start_energy: Option<f64>,
    pub half_life_threshold: Option<f64>,
    pub samples: Option<usize>,
    pub max_cascade_steps: Option<usize>,
    pub seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileHistogramConfig {
    pub bin_width: Option<f64>,
    pub max_energy: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub levels: Option<Vec<PathBuf>>,
    pub simulation: Option<FileSimulationConfig>,
    pub histogram: Option<FileHistogramConfig>,
}

impl FileConfig {
    /// Relative `levels` entries are resolved against the directory holding the file.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

        if let (Some(levels), Some(base)) = (config.levels.as_mut(), path.parent()) {
            for level in levels.iter_mut().filter(|p| p.is_relative()) {
                *level = base.join(&*level);
            }
        }
        Ok(config)
    }
}

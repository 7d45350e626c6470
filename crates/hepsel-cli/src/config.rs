//! Run configuration

use crate::cli::Cli;
use hepsel_core::{CollectionLabels, Error, Result};
use hepsel_telemetry::SinkConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Input-collection labels
    #[serde(default)]
    pub collections: CollectionLabels,

    /// Chamber geometry table; without one every ME0 match is skipped
    #[serde(default)]
    pub geometry: Option<PathBuf>,

    /// Output sink
    #[serde(default)]
    pub output: SinkConfig,
}

impl RunConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &Path, cli: &Cli) -> anyhow::Result<Self> {
        // A missing file falls back to defaults
        let mut config = if config_path.exists() {
            Self::from_file(config_path)?
        } else {
            Self::default()
        };

        if let Some(output) = &cli.output {
            config.output.path = output.clone();
        }

        if let Some(geometry) = &cli.geometry {
            config.geometry = Some(geometry.clone());
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{LakeError, Result};
use crate::storage::OutputCompression;

/// Static configuration of one batch run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Root of the enriched dataset (`iso_year=*/iso_week=*/data-0.parquet`).
    pub input_root: PathBuf,
    /// Root of the cleaned dataset, same layout.
    pub output_root: PathBuf,
    /// Worker threads. Each holds a whole partition in memory, so size this
    /// to the available headroom.
    pub workers: usize,
    /// Recompute partitions whose output already exists.
    pub force_reprocess: bool,
    pub verbose: bool,
    pub compression: OutputCompression,
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Fail every storage handle acquisition unless a credential file resolves.
    pub required: bool,
    /// Explicit credential file; overrides the environment and OS default.
    pub path: Option<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from("lake/silver/viajes_enriquecidos"),
            output_root: PathBuf::from("lake/silver/viajes_limpios"),
            workers: 1,
            force_reprocess: false,
            verbose: false,
            compression: OutputCompression::default(),
            credentials: CredentialsConfig::default(),
        }
    }
}

impl BatchConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LakeError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BatchConfig = toml::from_str(content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(LakeError::Config("workers must be at least 1".into()));
        }
        if self.input_root == self.output_root {
            return Err(LakeError::Config(format!(
                "input and output roots must differ (both {})",
                self.input_root.display()
            )));
        }
        Ok(())
    }
}

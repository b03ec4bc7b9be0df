use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::CONFIG_FILENAME;
use crate::error::DropError;
use crate::storage::StorageConfig;
use crate::util;

/// Configuration stored in `.datadrop/config.toml` within a dataset.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DatasetConfig {
    /// Content store backend, a dataset without one holds plain files only
    pub storage: Option<StorageConfig>,
}

impl DatasetConfig {
    pub fn config_path(hidden_dir: &Path) -> PathBuf {
        hidden_dir.join(CONFIG_FILENAME)
    }

    /// Load from `<hidden_dir>/config.toml`. Returns defaults if the file does not exist.
    pub fn load(hidden_dir: &Path) -> Result<Self, DropError> {
        let path = Self::config_path(hidden_dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = util::fs::read_from_path(&path)?;
        let config: DatasetConfig = toml::from_str(&text).map_err(DropError::TomlDe)?;
        Ok(config)
    }

    /// Persist to `<hidden_dir>/config.toml`.
    pub fn save(&self, hidden_dir: &Path) -> Result<(), DropError> {
        let text = toml::to_string_pretty(self).map_err(DropError::TomlSer)?;
        util::fs::write_to_path(Self::config_path(hidden_dir), text)?;
        Ok(())
    }
}

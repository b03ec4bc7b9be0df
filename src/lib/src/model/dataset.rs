use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::DropError;
use crate::util;

/// A dataset, identified by its absolute root path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DatasetRef {
    pub path: PathBuf,
}

impl DatasetRef {
    pub fn new(path: impl AsRef<Path>) -> DatasetRef {
        DatasetRef {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Resolve `path` against `base` and make sure it is a dataset root
    pub fn from_root(path: impl AsRef<Path>, base: impl AsRef<Path>) -> Result<DatasetRef, DropError> {
        let root = util::fs::absolute_path(path, base);
        if !util::fs::is_dataset_root(&root) {
            return Err(DropError::dataset_not_found(&root));
        }
        Ok(DatasetRef { path: root })
    }

    pub fn hidden_dir(&self) -> PathBuf {
        util::fs::datadrop_hidden_dir(&self.path)
    }

    /// Path relative to the dataset root, `path` must live inside the dataset
    pub fn relative_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, DropError> {
        Ok(path.as_ref().strip_prefix(&self.path)?.to_path_buf())
    }
}

impl fmt::Display for DatasetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::DEFAULT_MIN_COPIES;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct LocalStorageOpts {
    /// Version store root, relative paths are taken against the dataset root
    pub path: Option<PathBuf>,
    /// Copies that must exist on remotes before a checked drop removes content
    pub min_copies: usize,
    /// Roots of other version stores that may hold copies
    pub remotes: Vec<PathBuf>,
}

impl Default for LocalStorageOpts {
    fn default() -> Self {
        LocalStorageOpts {
            path: None,
            min_copies: DEFAULT_MIN_COPIES,
            remotes: Vec::new(),
        }
    }
}

//! Dirty-state detection for datasets
//!
//! The committed state of a dataset is a snapshot of every working-tree file
//! and its digest. A dataset is dirty when the working tree no longer matches
//! that snapshot.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::SNAPSHOT_FILENAME;
use crate::error::DropError;
use crate::model::DatasetRef;
use crate::util::{self, hasher};

/// Knows whether a dataset has uncommitted changes and how to commit them
pub trait WorkingTreeState: Debug + Send + Sync {
    fn is_dirty(&self, dataset: &DatasetRef) -> Result<bool, DropError>;

    fn save(&self, dataset: &DatasetRef, message: &str) -> Result<(), DropError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub message: String,
    /// Relative path (forward slashes) to content digest
    pub files: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn path(dataset: &DatasetRef) -> PathBuf {
        dataset.hidden_dir().join(SNAPSHOT_FILENAME)
    }

    pub fn load(dataset: &DatasetRef) -> Result<Option<Snapshot>, DropError> {
        let path = Snapshot::path(dataset);
        if !path.exists() {
            return Ok(None);
        }
        let text = util::fs::read_from_path(&path)?;
        Ok(Some(toml::from_str(&text)?))
    }

    /// Digest every file of the dataset as it is on disk right now
    pub fn capture(dataset: &DatasetRef, message: &str) -> Result<Snapshot, DropError> {
        let mut files = BTreeMap::new();
        for file in util::fs::walk_dataset_files(&dataset.path)? {
            let rel = dataset.relative_path(&file)?;
            files.insert(slash_path(&rel), hasher::hash_file_contents(&file)?);
        }
        Ok(Snapshot {
            message: message.to_string(),
            files,
        })
    }

    pub fn write(&self, dataset: &DatasetRef) -> Result<(), DropError> {
        let text = toml::to_string_pretty(self)?;
        util::fs::write_to_path(Snapshot::path(dataset), text)
    }
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// [`WorkingTreeState`] backed by `.datadrop/snapshot.toml`
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotState;

impl WorkingTreeState for SnapshotState {
    fn is_dirty(&self, dataset: &DatasetRef) -> Result<bool, DropError> {
        let current = Snapshot::capture(dataset, "")?;
        match Snapshot::load(dataset)? {
            Some(saved) => Ok(saved.files != current.files),
            None => Ok(!current.files.is_empty()),
        }
    }

    fn save(&self, dataset: &DatasetRef, message: &str) -> Result<(), DropError> {
        let snapshot = Snapshot::capture(dataset, message)?;
        log::debug!(
            "saving snapshot of {} file(s) in {dataset}: {message}",
            snapshot.files.len()
        );
        snapshot.write(dataset)
    }
}

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::DropError;
use crate::opts::StorageOpts;
use crate::storage::LocalContentStore;

/// Configuration for the content store backend, as written in the dataset config
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Storage type, only "local" is supported
    #[serde(rename = "type")]
    pub type_: String,
    /// Backend-specific settings
    #[serde(default)]
    pub settings: HashMap<String, String>,
}

/// Safety mode for a drop. Exactly one of the two is passed to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOptions {
    /// Verify that enough copies exist elsewhere before removing local content
    Checked,
    /// Remove local content without counting copies
    Force,
}

impl DropOptions {
    pub fn from_check(check: bool) -> DropOptions {
        if check {
            DropOptions::Checked
        } else {
            DropOptions::Force
        }
    }

    pub fn is_force(&self) -> bool {
        matches!(self, DropOptions::Force)
    }
}

/// Store-specific outcome of dropping one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeCode {
    Dropped,
    InsufficientCopies { found: usize, required: usize },
    Unsupported(String),
    Failed(String),
}

impl OutcomeCode {
    /// Human readable note, as the store would print it
    pub fn note(&self) -> Option<String> {
        match self {
            OutcomeCode::Dropped => None,
            OutcomeCode::InsufficientCopies { found, required } => Some(format!(
                "unsafe; could only verify the existence of {found} out of {required} necessary copies"
            )),
            OutcomeCode::Unsupported(note) | OutcomeCode::Failed(note) => Some(note.clone()),
        }
    }
}

/// One raw per-file report from a content store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOutcome {
    /// Absolute path of the file the outcome is about
    pub path: PathBuf,
    pub code: OutcomeCode,
}

impl RawOutcome {
    pub fn new(path: impl AsRef<Path>, code: OutcomeCode) -> RawOutcome {
        RawOutcome {
            path: path.as_ref().to_path_buf(),
            code,
        }
    }
}

/// The part of a dataset that holds file payloads and can drop them
#[async_trait]
pub trait ContentStore: Debug + Send + Sync + 'static {
    /// Drop local content for the given files and directories.
    ///
    /// Directories are expanded by the store. Only files the store acted on
    /// are reported, content that was not present locally is passed over
    /// silently. The returned order carries no meaning.
    ///
    /// # Arguments
    /// * `paths` - Absolute paths inside the dataset
    /// * `opts` - Whether copies must be verified before removal
    async fn drop_content(
        &self,
        paths: &[PathBuf],
        opts: DropOptions,
    ) -> Result<Vec<RawOutcome>, DropError>;

    /// Whether `path` is a file whose content is managed by this store
    fn is_tracked(&self, path: &Path) -> Result<bool, DropError>;

    /// Get the storage type identifier (e.g., "local")
    fn storage_type(&self) -> &str;
}

// This only creates a content store struct, it does not touch the disk
pub fn create_content_store(
    dataset_root: &Path,
    storage_opts: &StorageOpts,
) -> Result<Arc<dyn ContentStore>, DropError> {
    match storage_opts.type_.as_str() {
        constants::LOCAL_STORAGE_TYPE => {
            let Some(ref local_opts) = storage_opts.local_storage_opts else {
                return Err(DropError::basic_str("local storage opts not found"));
            };

            let versions_dir = match &local_opts.path {
                Some(path) if path.is_relative() => dataset_root.join(path),
                Some(path) => path.clone(),
                None => crate::util::fs::datadrop_hidden_dir(dataset_root)
                    .join(constants::VERSIONS_DIR),
            };

            let store = LocalContentStore::new(dataset_root, versions_dir)
                .with_min_copies(local_opts.min_copies)
                .with_remotes(local_opts.remotes.clone());

            Ok(Arc::new(store))
        }
        other => Err(DropError::unsupported_storage(other)),
    }
}

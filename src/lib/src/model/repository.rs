use std::fmt::Debug;
use std::sync::Arc;

use crate::config::DatasetConfig;
use crate::error::DropError;
use crate::model::DatasetRef;
use crate::opts::StorageOpts;
use crate::storage::{self, ContentStore};

/// An opened dataset and, if it has one, its content store
#[derive(Debug, Clone)]
pub struct Repository {
    pub dataset: DatasetRef,
    content_store: Option<Arc<dyn ContentStore>>,
}

impl Repository {
    pub fn new(dataset: DatasetRef, content_store: Option<Arc<dyn ContentStore>>) -> Repository {
        Repository {
            dataset,
            content_store,
        }
    }

    /// A dataset that only holds plain files
    pub fn without_store(dataset: DatasetRef) -> Repository {
        Repository::new(dataset, None)
    }

    pub fn content_store(&self) -> Option<&Arc<dyn ContentStore>> {
        self.content_store.as_ref()
    }

    pub fn supports_drop(&self) -> bool {
        self.content_store.is_some()
    }
}

/// Opens datasets for the drop workflow
pub trait RepositoryProvider: Debug + Send + Sync {
    fn open(&self, dataset: &DatasetRef) -> Result<Repository, DropError>;
}

/// Reads `.datadrop/config.toml` and binds the configured content store
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRepositoryProvider;

impl RepositoryProvider for LocalRepositoryProvider {
    fn open(&self, dataset: &DatasetRef) -> Result<Repository, DropError> {
        let config = DatasetConfig::load(&dataset.hidden_dir())?;
        let Some(storage_config) = config.storage else {
            log::debug!("dataset {dataset} has no content store");
            return Ok(Repository::without_store(dataset.clone()));
        };

        let opts = StorageOpts::from_dataset_config(&storage_config)?;
        let store = storage::create_content_store(&dataset.path, &opts)?;
        Ok(Repository::new(dataset.clone(), Some(store)))
    }
}

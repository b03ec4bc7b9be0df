use crate::constants;
use crate::error::DropError;
use crate::opts::LocalStorageOpts;
use crate::storage::StorageConfig;

use std::path::PathBuf;

#[derive(Clone, Debug, Default)]
pub struct StorageOpts {
    pub type_: String,
    pub local_storage_opts: Option<LocalStorageOpts>,
}

impl StorageOpts {
    pub fn from_dataset_config(config: &StorageConfig) -> Result<StorageOpts, DropError> {
        match config.type_.as_str() {
            constants::LOCAL_STORAGE_TYPE => {
                let path = config
                    .settings
                    .get(constants::STORAGE_PATH_KEY)
                    .map(PathBuf::from);

                let min_copies = match config.settings.get(constants::STORAGE_MIN_COPIES_KEY) {
                    Some(value) => value.trim().parse::<usize>().map_err(|_| {
                        DropError::basic_str(format!(
                            "invalid {} in storage settings: {value:?}",
                            constants::STORAGE_MIN_COPIES_KEY
                        ))
                    })?,
                    None => constants::DEFAULT_MIN_COPIES,
                };

                let remotes = config
                    .settings
                    .get(constants::STORAGE_REMOTES_KEY)
                    .map(|value| {
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|remote| !remote.is_empty())
                            .map(PathBuf::from)
                            .collect()
                    })
                    .unwrap_or_default();

                Ok(StorageOpts {
                    type_: constants::LOCAL_STORAGE_TYPE.to_string(),
                    local_storage_opts: Some(LocalStorageOpts {
                        path,
                        min_copies,
                        remotes,
                    }),
                })
            }
            _ => Err(DropError::unsupported_storage(&config.type_)),
        }
    }
}

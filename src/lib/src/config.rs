pub mod dataset_config;

pub use crate::config::dataset_config::DatasetConfig;

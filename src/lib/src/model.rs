pub mod dataset;
pub mod path_group;
pub mod reported_paths;
pub mod repository;
pub mod status_record;

pub use crate::model::dataset::DatasetRef;
pub use crate::model::path_group::{GroupedPaths, PathGroup, UnavailablePath};
pub use crate::model::reported_paths::ReportedPaths;
pub use crate::model::repository::{LocalRepositoryProvider, Repository, RepositoryProvider};
pub use crate::model::status_record::{DropStatus, EntryType, StatusRecord};

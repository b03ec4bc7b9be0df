pub mod drop_opts;
pub mod local_storage_opts;
pub mod storage_opts;

pub use crate::opts::drop_opts::{DirtyPolicy, DropOpts};
pub use crate::opts::local_storage_opts::LocalStorageOpts;
pub use crate::opts::storage_opts::StorageOpts;

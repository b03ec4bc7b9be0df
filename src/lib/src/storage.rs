pub mod content_store;
pub mod local;
pub mod pointer;

pub use crate::storage::content_store::{
    create_content_store, ContentStore, DropOptions, OutcomeCode, RawOutcome, StorageConfig,
};
pub use crate::storage::local::LocalContentStore;
pub use crate::storage::pointer::PointerFile;

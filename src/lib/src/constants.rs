//! Constants used throughout the codebase
//!

/// Name of the tool
pub const DATADROP: &str = "datadrop";
/// Version of the library, taken from the crate manifest
pub const DATADROP_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Hidden directory that marks the root of a dataset
pub const DATADROP_HIDDEN_DIR: &str = ".datadrop";
/// Per dataset configuration file, lives in the hidden dir
pub const CONFIG_FILENAME: &str = "config.toml";
/// Snapshot of the committed working tree, lives in the hidden dir
pub const SNAPSHOT_FILENAME: &str = "snapshot.toml";
/// Default directory for the local version store, relative to the hidden dir
pub const VERSIONS_DIR: &str = "versions";
/// Name of the file that holds the content of a version
pub const VERSION_FILE_NAME: &str = "data";

/// Storage backend type for the local content store
pub const LOCAL_STORAGE_TYPE: &str = "local";
/// Settings key for the local version store path
pub const STORAGE_PATH_KEY: &str = "path";
/// Settings key for the number of copies that must exist elsewhere before dropping
pub const STORAGE_MIN_COPIES_KEY: &str = "min_copies";
/// Settings key for the comma separated list of remote version stores
pub const STORAGE_REMOTES_KEY: &str = "remotes";
/// Number of verified copies required by default
pub const DEFAULT_MIN_COPIES: usize = 1;

/// The action name every status record carries
pub const DROP_ACTION: &str = "drop";
/// Default log target for the drop workflow
pub const DEFAULT_LOG_TARGET: &str = "datadrop::drop";

/// Message for datasets or files without a content store
pub const NO_CONTENT_STORE_MSG: &str = "no content store for this path";
/// Snapshot message used by the save-before dirty policy
pub const SAVE_BEFORE_DROP_MSG: &str = "[DATADROP] save before drop";

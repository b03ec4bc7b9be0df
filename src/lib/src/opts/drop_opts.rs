use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::DropError;

/// What to do with datasets that have uncommitted changes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DirtyPolicy {
    /// Save pending changes before dropping
    #[default]
    SaveBefore,
    Ignore,
    /// Abort the whole drop if any dataset is dirty
    Fail,
}

impl DirtyPolicy {
    pub const VARIANTS: [&'static str; 3] = ["save-before", "ignore", "fail"];

    pub fn as_str(&self) -> &'static str {
        match self {
            DirtyPolicy::SaveBefore => "save-before",
            DirtyPolicy::Ignore => "ignore",
            DirtyPolicy::Fail => "fail",
        }
    }
}

impl fmt::Display for DirtyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DirtyPolicy {
    type Err = DropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "save-before" => Ok(DirtyPolicy::SaveBefore),
            "ignore" => Ok(DirtyPolicy::Ignore),
            "fail" => Ok(DirtyPolicy::Fail),
            _ => Err(DropError::basic_str(format!(
                "unknown dirty policy {s:?}, expected one of {}",
                DirtyPolicy::VARIANTS.join(", ")
            ))),
        }
    }
}

/// A single drop request
#[derive(Clone, Debug)]
pub struct DropOpts {
    /// Requested paths, absolute or relative, in request order
    pub paths: Vec<PathBuf>,
    /// Reference dataset, relative paths resolve against its root
    pub dataset: Option<PathBuf>,
    pub recursive: bool,
    /// Sub-dataset depth to descend into, `None` is unbounded
    pub recursion_limit: Option<usize>,
    /// Verify remote copies before removing content
    pub check: bool,
    pub if_dirty: DirtyPolicy,
    /// Report paths without a content store as `impossible` instead of `notneeded`
    pub no_content_store_is_error: bool,
}

impl Default for DropOpts {
    fn default() -> Self {
        DropOpts {
            paths: Vec::new(),
            dataset: None,
            recursive: false,
            recursion_limit: None,
            check: true,
            if_dirty: DirtyPolicy::default(),
            no_content_store_is_error: false,
        }
    }
}

impl DropOpts {
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> DropOpts {
        DropOpts {
            paths: paths.iter().map(|p| p.as_ref().to_path_buf()).collect(),
            ..DropOpts::default()
        }
    }

    /// Drop everything in the dataset at `dataset`
    pub fn from_dataset<P: AsRef<Path>>(dataset: P) -> DropOpts {
        DropOpts {
            dataset: Some(dataset.as_ref().to_path_buf()),
            ..DropOpts::default()
        }
    }
}

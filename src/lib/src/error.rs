//! Errors for the datadrop library
//!
//! Enumeration for all errors that can occur in the library. Per-path
//! conditions of a drop never surface as a `DropError`, they are reported as
//! status records instead. Errors are reserved for failures that stop a
//! whole operation (a dirty dataset under the `fail` policy, a bad request)
//! or a collaborator that could not be consulted at all.
//!

use derive_more::{Display, Error};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf, StripPrefixError};

#[derive(Debug)]
pub struct StringError(String);

impl StringError {
    pub fn new(s: impl Into<String>) -> Self {
        StringError(s.into())
    }
}

impl fmt::Display for StringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StringError {}

impl From<&str> for StringError {
    fn from(s: &str) -> Self {
        StringError(s.to_string())
    }
}

impl From<String> for StringError {
    fn from(s: String) -> Self {
        StringError(s)
    }
}

#[derive(Debug)]
pub struct PathBufError(PathBuf);

impl PathBufError {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for PathBufError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl std::error::Error for PathBufError {}

impl From<&Path> for PathBufError {
    fn from(p: &Path) -> Self {
        PathBufError(p.to_path_buf())
    }
}

impl From<PathBuf> for PathBufError {
    fn from(p: PathBuf) -> Self {
        PathBufError(p)
    }
}

#[derive(Debug, Display, Error)]
pub enum DropError {
    // Dataset
    #[display("dataset has uncommitted changes: {_0}")]
    DirtyDataset(Box<PathBufError>),
    #[display("no dataset found at: {_0}")]
    DatasetNotFound(Box<PathBufError>),

    // Storage
    #[display("unsupported storage type: {_0}")]
    UnsupportedStorage(StringError),

    // Wrappers
    #[display("{_0}")]
    IO(io::Error),
    #[display("could not parse toml: {_0}")]
    TomlDe(toml::de::Error),
    #[display("could not write toml: {_0}")]
    TomlSer(toml::ser::Error),
    #[display("{_0}")]
    WalkDir(walkdir::Error),
    #[display("{_0}")]
    StripPrefix(StripPrefixError),

    // Fallback
    #[display("{_0}")]
    Basic(StringError),
}

impl DropError {
    pub fn basic_str(s: impl AsRef<str>) -> Self {
        DropError::Basic(StringError::from(s.as_ref()))
    }

    pub fn dirty_dataset(path: impl AsRef<Path>) -> Self {
        DropError::DirtyDataset(Box::new(PathBufError::from(path.as_ref())))
    }

    pub fn dataset_not_found(path: impl AsRef<Path>) -> Self {
        DropError::DatasetNotFound(Box::new(PathBufError::from(path.as_ref())))
    }

    pub fn unsupported_storage(type_: impl AsRef<str>) -> Self {
        DropError::UnsupportedStorage(StringError::from(type_.as_ref()))
    }

    /// True when the error stopped the operation because a dataset was dirty
    pub fn is_dirty_dataset(&self) -> bool {
        matches!(self, DropError::DirtyDataset(_))
    }
}

impl From<io::Error> for DropError {
    fn from(error: io::Error) -> Self {
        DropError::IO(error)
    }
}

impl From<toml::de::Error> for DropError {
    fn from(error: toml::de::Error) -> Self {
        DropError::TomlDe(error)
    }
}

impl From<toml::ser::Error> for DropError {
    fn from(error: toml::ser::Error) -> Self {
        DropError::TomlSer(error)
    }
}

impl From<walkdir::Error> for DropError {
    fn from(error: walkdir::Error) -> Self {
        DropError::WalkDir(error)
    }
}

impl From<StripPrefixError> for DropError {
    fn from(error: StripPrefixError) -> Self {
        DropError::StripPrefix(error)
    }
}

//! Filesystem helpers shared by the grouping, snapshot and storage code
//!

use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::constants::DATADROP_HIDDEN_DIR;
use crate::error::DropError;

pub fn datadrop_hidden_dir(path: impl AsRef<Path>) -> PathBuf {
    path.as_ref().join(DATADROP_HIDDEN_DIR)
}

/// A directory is a dataset root iff it holds the hidden datadrop dir
pub fn is_dataset_root(path: impl AsRef<Path>) -> bool {
    datadrop_hidden_dir(path).is_dir()
}

/// Nearest dataset root that contains `path`, the path itself included
pub fn find_owning_dataset(path: impl AsRef<Path>) -> Option<PathBuf> {
    let path = path.as_ref();
    let start = if path.is_dir() { Some(path) } else { path.parent() };
    start?
        .ancestors()
        .find(|dir| is_dataset_root(dir))
        .map(Path::to_path_buf)
}

/// Resolve `.` and `..` without touching the filesystem
pub fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Absolute, normalized form of `path`, relative paths are taken against `base`
pub fn absolute_path(path: impl AsRef<Path>, base: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(base.as_ref().join(path))
    }
}

pub fn current_dir() -> Result<PathBuf, DropError> {
    Ok(std::env::current_dir()?)
}

/// Like `Path::exists` but also true for dangling symlinks
pub fn path_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().symlink_metadata().is_ok()
}

pub fn is_subpath(path: impl AsRef<Path>, dir: impl AsRef<Path>) -> bool {
    path.as_ref().starts_with(dir.as_ref())
}

/// All files under `path` that belong to the dataset `path` lives in.
///
/// The hidden datadrop dir and nested dataset roots are not entered. A file
/// path yields itself.
pub fn walk_dataset_files(path: impl AsRef<Path>) -> Result<Vec<PathBuf>, DropError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(path.as_ref())
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            if entry.file_name() == DATADROP_HIDDEN_DIR {
                return false;
            }
            entry.depth() == 0 || !is_dataset_root(entry.path())
        });

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Nearest dataset roots strictly below `root`, not descending into them
pub fn find_sub_datasets(root: impl AsRef<Path>) -> Result<Vec<PathBuf>, DropError> {
    let mut found = Vec::new();
    let mut walker = WalkDir::new(root.as_ref()).sort_by_file_name().into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if entry.file_name() == DATADROP_HIDDEN_DIR {
            walker.skip_current_dir();
            continue;
        }
        if entry.depth() > 0 && is_dataset_root(entry.path()) {
            found.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        }
    }
    Ok(found)
}

pub fn read_from_path(path: impl AsRef<Path>) -> Result<String, DropError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|err| {
        log::debug!("could not read {path:?}: {err}");
        DropError::from(err)
    })
}

pub fn write_to_path(path: impl AsRef<Path>, data: impl AsRef<str>) -> Result<(), DropError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data.as_ref())?;
    Ok(())
}

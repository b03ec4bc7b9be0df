use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::model::DatasetRef;

/// Requested paths keyed by the dataset that owns them.
///
/// Datasets and the paths within each dataset keep their insertion order. A
/// path is only ever recorded once, under the first dataset it was added to.
#[derive(Debug, Clone, Default)]
pub struct PathGroup {
    groups: Vec<(DatasetRef, Vec<PathBuf>)>,
    index: HashMap<DatasetRef, usize>,
    seen: HashSet<PathBuf>,
}

impl PathGroup {
    pub fn new() -> PathGroup {
        PathGroup::default()
    }

    /// Returns false if the path was already grouped
    pub fn insert(&mut self, dataset: &DatasetRef, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if !self.seen.insert(path.to_path_buf()) {
            return false;
        }

        let idx = match self.index.get(dataset) {
            Some(idx) => *idx,
            None => {
                self.groups.push((dataset.clone(), Vec::new()));
                self.index.insert(dataset.clone(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[idx].1.push(path.to_path_buf());
        true
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.seen.contains(path.as_ref())
    }

    pub fn paths_for(&self, dataset: &DatasetRef) -> Option<&[PathBuf]> {
        self.index
            .get(dataset)
            .map(|idx| self.groups[*idx].1.as_slice())
    }

    pub fn datasets(&self) -> Vec<DatasetRef> {
        self.groups.iter().map(|(ds, _)| ds.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl IntoIterator for PathGroup {
    type Item = (DatasetRef, Vec<PathBuf>);
    type IntoIter = std::vec::IntoIter<(DatasetRef, Vec<PathBuf>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// A requested path that did not exist when the drop started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnavailablePath {
    /// Absolute, normalized path
    pub path: PathBuf,
    /// The path as it was given in the request
    pub requested: PathBuf,
}

/// Output of the path grouper
#[derive(Debug, Clone, Default)]
pub struct GroupedPaths {
    pub groups: PathGroup,
    pub unavailable: Vec<UnavailablePath>,
    /// Existing paths that are not inside of any dataset
    pub unowned: Vec<PathBuf>,
}

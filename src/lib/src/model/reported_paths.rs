use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::model::DropStatus;
use crate::util;

/// Paths the content store reported on, bucketed by canonical status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportedPaths {
    by_status: HashMap<DropStatus, HashSet<PathBuf>>,
}

impl ReportedPaths {
    pub fn new() -> ReportedPaths {
        ReportedPaths::default()
    }

    pub fn insert(&mut self, status: DropStatus, path: impl AsRef<Path>) {
        self.by_status
            .entry(status)
            .or_default()
            .insert(path.as_ref().to_path_buf());
    }

    /// True if the store said anything about this exact path
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        self.by_status.values().any(|paths| paths.contains(path))
    }

    /// Number of reported failures (`error` or `impossible`) at or below `dir`
    pub fn failures_under(&self, dir: impl AsRef<Path>) -> usize {
        self.count_under(dir.as_ref(), DropStatus::is_failure)
    }

    /// Number of confirmed drops at or below `dir`
    pub fn dropped_under(&self, dir: impl AsRef<Path>) -> usize {
        self.count_under(dir.as_ref(), |status| *status == DropStatus::Ok)
    }

    pub fn is_empty(&self) -> bool {
        self.by_status.values().all(HashSet::is_empty)
    }

    fn count_under(&self, dir: &Path, keep: impl Fn(&DropStatus) -> bool) -> usize {
        self.by_status
            .iter()
            .filter(|(status, _)| keep(*status))
            .flat_map(|(_, paths)| paths.iter())
            .filter(|path| util::fs::is_subpath(path, dir))
            .count()
    }
}

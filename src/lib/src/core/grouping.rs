//! Partition requested paths by the dataset that owns them
//!

use std::path::{Path, PathBuf};

use crate::error::DropError;
use crate::model::{DatasetRef, GroupedPaths, UnavailablePath};
use crate::util;

/// Group `paths` under their owning datasets.
///
/// Relative paths resolve against the root of `dataset` when one is given,
/// otherwise against `cwd`. An empty request means the whole reference
/// dataset, or `cwd` when there is none. Nothing on disk is modified.
///
/// With `recursive`, every requested directory also pulls in the roots of
/// the sub-datasets below it, up to `recursion_limit` levels of nesting
/// counted from that directory. Sub-datasets past the limit are left out
/// without being reported.
pub fn group_paths(
    paths: &[PathBuf],
    dataset: Option<&DatasetRef>,
    recursive: bool,
    recursion_limit: Option<usize>,
    cwd: &Path,
) -> Result<GroupedPaths, DropError> {
    let base = dataset.map(|ds| ds.path.as_path()).unwrap_or(cwd);
    let requested: Vec<PathBuf> = if paths.is_empty() {
        vec![base.to_path_buf()]
    } else {
        paths.to_vec()
    };

    let mut grouped = GroupedPaths::default();
    for path in requested {
        let abs = util::fs::absolute_path(&path, base);
        if grouped.groups.contains(&abs)
            || grouped.unowned.contains(&abs)
            || grouped.unavailable.iter().any(|u| u.path == abs)
        {
            continue;
        }

        if !util::fs::path_exists(&abs) {
            log::debug!("group_paths {path:?} does not exist");
            grouped.unavailable.push(UnavailablePath {
                path: abs,
                requested: path,
            });
            continue;
        }

        let Some(owner) = util::fs::find_owning_dataset(&abs) else {
            log::debug!("group_paths {abs:?} is not in a dataset");
            grouped.unowned.push(abs);
            continue;
        };
        let owner = DatasetRef::new(owner);
        grouped.groups.insert(&owner, &abs);

        if recursive && abs.is_dir() {
            for sub in sub_datasets_within(&abs, recursion_limit)? {
                let sub_ds = DatasetRef::new(&sub);
                grouped.groups.insert(&sub_ds, &sub);
            }
        }
    }

    Ok(grouped)
}

/// Sub-dataset roots below `dir`, level by level, at most `limit` levels deep
fn sub_datasets_within(dir: &Path, limit: Option<usize>) -> Result<Vec<PathBuf>, DropError> {
    let mut found = Vec::new();
    let mut level = util::fs::find_sub_datasets(dir)?;
    let mut depth = 1;
    while !level.is_empty() && limit.map_or(true, |limit| depth <= limit) {
        let mut next = Vec::new();
        for sub in &level {
            next.extend(util::fs::find_sub_datasets(sub)?);
        }
        found.append(&mut level);
        level = next;
        depth += 1;
    }
    Ok(found)
}

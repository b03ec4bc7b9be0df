//! Records for requested paths the content store said nothing about
//!

use std::path::{Path, PathBuf};

use crate::constants::NO_CONTENT_STORE_MSG;
use crate::error::DropError;
use crate::model::{DatasetRef, DropStatus, EntryType, ReportedPaths, StatusRecord};
use crate::storage::ContentStore;

/// Synthesize one record for every requested path missing from `reported`.
///
/// Directories are judged by what was reported beneath them: any failure
/// makes the directory `impossible`, confirmed drops make it `ok`, and
/// otherwise there was nothing to drop. Silent files are `notneeded`.
pub fn reconcile(
    dataset: &DatasetRef,
    requested: &[PathBuf],
    reported: &ReportedPaths,
    store: &dyn ContentStore,
    refds: Option<&Path>,
) -> Result<Vec<StatusRecord>, DropError> {
    let mut records = Vec::new();
    for path in requested {
        if reported.contains(path) {
            continue;
        }

        let record = if path.is_dir() {
            directory_record(dataset, path, reported, refds)
        } else {
            let message = if store.is_tracked(path)? {
                format!("nothing to drop from {}", path.display())
            } else {
                NO_CONTENT_STORE_MSG.to_string()
            };
            StatusRecord::new(path, DropStatus::NotNeeded, refds)
                .with_message(message)
                .with_type(EntryType::File)
        };
        records.push(record);
    }
    Ok(records)
}

fn directory_record(
    dataset: &DatasetRef,
    dir: &Path,
    reported: &ReportedPaths,
    refds: Option<&Path>,
) -> StatusRecord {
    // Stores only report files. A directory's status is derived from the
    // files reported beneath it, so `ok` here means every confirmed outcome
    // below it was a drop.
    let record = if reported.failures_under(dir) > 0 {
        StatusRecord::new(dir, DropStatus::Impossible, refds).with_message(format!(
            "could not drop some content in {} {}",
            dataset,
            dir.display()
        ))
    } else if reported.dropped_under(dir) > 0 {
        StatusRecord::new(dir, DropStatus::Ok, refds)
    } else {
        StatusRecord::new(dir, DropStatus::NotNeeded, refds)
            .with_message(format!("nothing to drop from {}", dir.display()))
    };
    record.with_type(EntryType::Directory)
}

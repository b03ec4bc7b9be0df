//! Cleanliness check that runs once before anything is dropped
//!

use crate::constants::SAVE_BEFORE_DROP_MSG;
use crate::core::snapshot::WorkingTreeState;
use crate::error::DropError;
use crate::model::DatasetRef;
use crate::opts::DirtyPolicy;

/// Apply `policy` to every dataset that is about to be touched.
///
/// Under [`DirtyPolicy::Fail`] the first dirty dataset aborts with
/// [`DropError::DirtyDataset`] and nothing is saved.
pub fn ensure_clean(
    datasets: &[DatasetRef],
    policy: DirtyPolicy,
    state: &dyn WorkingTreeState,
    log_target: &str,
) -> Result<(), DropError> {
    if policy == DirtyPolicy::Ignore {
        log::debug!(target: log_target, "ignoring dirty state of {} dataset(s)", datasets.len());
        return Ok(());
    }

    let mut dirty = Vec::new();
    for dataset in datasets {
        if state.is_dirty(dataset)? {
            dirty.push(dataset);
        }
    }

    match policy {
        DirtyPolicy::Fail => match dirty.first() {
            Some(dataset) => {
                log::warn!(target: log_target, "refusing to drop, {dataset} is dirty");
                Err(DropError::dirty_dataset(&dataset.path))
            }
            None => Ok(()),
        },
        DirtyPolicy::SaveBefore => {
            for dataset in dirty {
                log::info!(target: log_target, "saving {dataset} before drop");
                state.save(dataset, SAVE_BEFORE_DROP_MSG)?;
            }
            Ok(())
        }
        DirtyPolicy::Ignore => Ok(()),
    }
}

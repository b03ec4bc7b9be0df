//! Run one dataset's drop against its content store and normalize the outcomes
//!

use std::path::{Path, PathBuf};

use crate::constants::NO_CONTENT_STORE_MSG;
use crate::error::DropError;
use crate::model::{DropStatus, EntryType, ReportedPaths, Repository, StatusRecord};
use crate::storage::{ContentStore, DropOptions, OutcomeCode, RawOutcome};

/// Records produced by the store plus the paths they were about
#[derive(Debug, Clone, Default)]
pub struct DropReport {
    pub records: Vec<StatusRecord>,
    pub reported: ReportedPaths,
}

/// Fixed translation of store outcomes to report statuses
pub fn status_for(code: &OutcomeCode) -> DropStatus {
    match code {
        OutcomeCode::Dropped => DropStatus::Ok,
        OutcomeCode::InsufficientCopies { .. } => DropStatus::Error,
        OutcomeCode::Failed(_) => DropStatus::Error,
        OutcomeCode::Unsupported(_) => DropStatus::Impossible,
    }
}

fn outcome_to_record(outcome: &RawOutcome, refds: Option<&Path>) -> StatusRecord {
    let record = StatusRecord::new(&outcome.path, status_for(&outcome.code), refds)
        .with_type(EntryType::File);
    match outcome.code.note() {
        Some(note) => record.with_message(note),
        None => record,
    }
}

/// One record per path for a dataset that cannot drop anything
pub fn no_content_store_records(
    paths: &[PathBuf],
    no_content_store_is_error: bool,
    refds: Option<&Path>,
) -> Vec<StatusRecord> {
    let status = if no_content_store_is_error {
        DropStatus::Impossible
    } else {
        DropStatus::NotNeeded
    };
    paths
        .iter()
        .map(|path| StatusRecord::new(path, status, refds).with_message(NO_CONTENT_STORE_MSG))
        .collect()
}

/// Ask `store` to drop `paths` and translate every outcome it reports
pub async fn drop_with_store(
    store: &dyn ContentStore,
    paths: &[PathBuf],
    check: bool,
    refds: Option<&Path>,
    log_target: &str,
) -> Result<DropReport, DropError> {
    let opts = DropOptions::from_check(check);
    log::debug!(target: log_target, "dropping {} path(s) with {opts:?}", paths.len());
    let outcomes = store.drop_content(paths, opts).await?;

    let mut report = DropReport::default();
    for outcome in &outcomes {
        let record = outcome_to_record(outcome, refds);
        if record.status.is_failure() {
            log::warn!(
                target: log_target,
                "could not drop {:?}: {}",
                outcome.path,
                record.message.as_deref().unwrap_or("")
            );
        }
        report.reported.insert(record.status, &outcome.path);
        report.records.push(record);
    }
    Ok(report)
}

/// Drop `paths` from `repo`, falling back to per-path records when it has no store
pub async fn drop_paths(
    repo: &Repository,
    paths: &[PathBuf],
    check: bool,
    no_content_store_is_error: bool,
    refds: Option<&Path>,
    log_target: &str,
) -> Result<DropReport, DropError> {
    match repo.content_store() {
        Some(store) => drop_with_store(store.as_ref(), paths, check, refds, log_target).await,
        None => {
            log::debug!(target: log_target, "{} has no content store", repo.dataset);
            Ok(DropReport {
                records: no_content_store_records(paths, no_content_store_is_error, refds),
                reported: ReportedPaths::default(),
            })
        }
    }
}

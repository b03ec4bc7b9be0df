//! # datadrop drop
//!
//! Drop the local content of files in one or more datasets.
//!
//! [`run`] returns a lazy stream. Nothing is grouped, checked or dropped until
//! the stream is polled, and dropping it early only skips the datasets that
//! have not been reached yet. Content that was already removed stays removed.
//!
//! Per-path problems are reported as records. The stream yields an `Err` only
//! when the whole operation has to stop (an invalid reference dataset, or a
//! dirty dataset under [`DirtyPolicy::Fail`]), and it ends right after that
//! item.
//!

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};

use crate::constants::DEFAULT_LOG_TARGET;
use crate::core::snapshot::{SnapshotState, WorkingTreeState};
use crate::core::{executor, grouping, guard, reconcile};
use crate::error::DropError;
use crate::model::{
    DatasetRef, DropStatus, GroupedPaths, LocalRepositoryProvider, RepositoryProvider,
    StatusRecord,
};
use crate::opts::{DirtyPolicy, DropOpts};
use crate::util;

/// Collaborators and settings for one drop run
#[derive(Clone, Debug)]
pub struct DropContext {
    pub provider: Arc<dyn RepositoryProvider>,
    pub tree_state: Arc<dyn WorkingTreeState>,
    /// Every log line of the run goes to this target
    pub log_target: String,
    /// Base for relative paths when no dataset is given, defaults to the process cwd
    pub cwd: Option<PathBuf>,
}

impl DropContext {
    /// Datasets on the local filesystem, configured by `.datadrop/config.toml`
    pub fn local() -> DropContext {
        DropContext {
            provider: Arc::new(LocalRepositoryProvider),
            tree_state: Arc::new(SnapshotState),
            log_target: DEFAULT_LOG_TARGET.to_string(),
            cwd: None,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn RepositoryProvider>) -> DropContext {
        self.provider = provider;
        self
    }

    pub fn with_log_target(mut self, log_target: impl Into<String>) -> DropContext {
        self.log_target = log_target.into();
        self
    }

    pub fn with_cwd(mut self, cwd: impl AsRef<Path>) -> DropContext {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }
}

enum State {
    Start(DropOpts),
    GuardCheck(Plan),
    Dropping(Plan),
    Done,
}

/// Everything decided before the first dataset is touched
struct Plan {
    queue: VecDeque<(DatasetRef, Vec<PathBuf>)>,
    refds: Option<PathBuf>,
    check: bool,
    if_dirty: DirtyPolicy,
    no_content_store_is_error: bool,
}

type Batch = Vec<Result<StatusRecord, DropError>>;

/// Drop the content requested by `opts`, one record per requested path.
pub fn run(opts: DropOpts, ctx: DropContext) -> BoxStream<'static, Result<StatusRecord, DropError>> {
    stream::unfold((State::Start(opts), ctx), |(state, ctx)| async move {
        let (batch, next) = match state {
            State::Start(opts) => start(opts, &ctx),
            State::GuardCheck(plan) => check_guard(plan, &ctx),
            State::Dropping(mut plan) => {
                let (dataset, paths) = plan.queue.pop_front()?;
                let records = drop_dataset(&ctx, &dataset, &paths, &plan).await;
                let batch = records.into_iter().map(Ok).collect();
                (batch, State::Dropping(plan))
            }
            State::Done => return None,
        };
        Some((batch, (next, ctx)))
    })
    .flat_map(stream::iter)
    .boxed()
}

fn start(opts: DropOpts, ctx: &DropContext) -> (Batch, State) {
    match plan(opts, ctx) {
        Ok((grouped, plan)) => {
            let batch = out_of_scope_records(&grouped, plan.refds.as_deref())
                .into_iter()
                .map(Ok)
                .collect();
            (batch, State::GuardCheck(plan))
        }
        Err(err) => (vec![Err(err)], State::Done),
    }
}

fn plan(opts: DropOpts, ctx: &DropContext) -> Result<(GroupedPaths, Plan), DropError> {
    let cwd = match &ctx.cwd {
        Some(cwd) => cwd.clone(),
        None => util::fs::current_dir()?,
    };
    let refds = match &opts.dataset {
        Some(dataset) => Some(DatasetRef::from_root(dataset, &cwd)?),
        None => None,
    };

    let grouped = grouping::group_paths(
        &opts.paths,
        refds.as_ref(),
        opts.recursive,
        opts.recursion_limit,
        &cwd,
    )?;
    log::info!(
        target: ctx.log_target.as_str(),
        "drop {} path(s) in {} dataset(s), {} unavailable",
        opts.paths.len().max(1),
        grouped.groups.len(),
        grouped.unavailable.len()
    );

    let plan = Plan {
        queue: grouped.groups.clone().into_iter().collect(),
        refds: refds.map(|ds| ds.path),
        check: opts.check,
        if_dirty: opts.if_dirty,
        no_content_store_is_error: opts.no_content_store_is_error,
    };
    Ok((grouped, plan))
}

/// Records for paths that never reach a dataset
fn out_of_scope_records(grouped: &GroupedPaths, refds: Option<&Path>) -> Vec<StatusRecord> {
    let missing = grouped.unavailable.iter().map(|unavailable| {
        StatusRecord::new(&unavailable.path, DropStatus::NotNeeded, refds).with_message(format!(
            "path does not exist: {}",
            unavailable.requested.display()
        ))
    });
    let unowned = grouped.unowned.iter().map(|path| {
        StatusRecord::new(path, DropStatus::Impossible, refds)
            .with_message(format!("path not underneath any dataset: {}", path.display()))
    });
    missing.chain(unowned).collect()
}

fn check_guard(plan: Plan, ctx: &DropContext) -> (Batch, State) {
    let datasets: Vec<DatasetRef> = plan.queue.iter().map(|(ds, _)| ds.clone()).collect();
    match guard::ensure_clean(
        &datasets,
        plan.if_dirty,
        ctx.tree_state.as_ref(),
        &ctx.log_target,
    ) {
        Ok(()) => (Vec::new(), State::Dropping(plan)),
        Err(err) => (vec![Err(err)], State::Done),
    }
}

/// Drop and reconcile one dataset. Failures of its collaborators become
/// `error` records for its paths instead of stopping the run.
async fn drop_dataset(
    ctx: &DropContext,
    dataset: &DatasetRef,
    paths: &[PathBuf],
    plan: &Plan,
) -> Vec<StatusRecord> {
    let target = ctx.log_target.as_str();
    let refds = plan.refds.as_deref();

    let repo = match ctx.provider.open(dataset) {
        Ok(repo) => repo,
        Err(err) => {
            log::warn!(target: target, "could not open {dataset}: {err}");
            return error_records(paths, refds, &err);
        }
    };

    let report = match executor::drop_paths(
        &repo,
        paths,
        plan.check,
        plan.no_content_store_is_error,
        refds,
        target,
    )
    .await
    {
        Ok(report) => report,
        Err(err) => {
            log::warn!(target: target, "drop failed in {dataset}: {err}");
            return error_records(paths, refds, &err);
        }
    };

    let mut records = report.records;
    if let Some(store) = repo.content_store() {
        match reconcile::reconcile(dataset, paths, &report.reported, store.as_ref(), refds) {
            Ok(synthesized) => records.extend(synthesized),
            Err(err) => {
                log::warn!(target: target, "could not inspect paths in {dataset}: {err}");
                let silent: Vec<PathBuf> = paths
                    .iter()
                    .filter(|path| !report.reported.contains(path))
                    .cloned()
                    .collect();
                records.extend(error_records(&silent, refds, &err));
            }
        }
    }

    let dropped = records.iter().filter(|r| r.status == DropStatus::Ok).count();
    let failed = records.iter().filter(|r| r.status.is_failure()).count();
    log::info!(
        target: target,
        "{dataset}: {} record(s), {dropped} ok, {failed} failed",
        records.len()
    );
    records
}

fn error_records(paths: &[PathBuf], refds: Option<&Path>, err: &DropError) -> Vec<StatusRecord> {
    paths
        .iter()
        .map(|path| StatusRecord::new(path, DropStatus::Error, refds).with_message(err.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NO_CONTENT_STORE_MSG;
    use crate::model::EntryType;
    use crate::storage::{DropOptions, OutcomeCode, RawOutcome};
    use crate::test::{self, RecordingStore, StaticRepositoryProvider};
    use std::collections::HashSet;

    async fn collect(
        opts: DropOpts,
        ctx: DropContext,
    ) -> Vec<Result<StatusRecord, DropError>> {
        run(opts, ctx).collect().await
    }

    fn records(items: Vec<Result<StatusRecord, DropError>>) -> Result<Vec<StatusRecord>, DropError> {
        items.into_iter().collect()
    }

    #[tokio::test]
    async fn test_missing_path_is_notneeded() -> Result<(), DropError> {
        test::run_empty_dir_test_async(|dir| async move {
            let ds = test::init_dataset(dir.join("ds"))?;
            let mut opts = DropOpts::from_paths(&["missing.txt"]);
            opts.dataset = Some(ds.path.clone());

            let ctx = DropContext::local().with_log_target("datadrop::tests");
            assert_eq!(ctx.log_target, "datadrop::tests");

            let records = records(collect(opts, ctx).await)?;
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].status, DropStatus::NotNeeded);
            assert_eq!(
                records[0].message.as_deref(),
                Some("path does not exist: missing.txt")
            );
            assert_eq!(records[0].refds.as_deref(), Some(ds.path.as_path()));
            Ok(())
        })
        .await
    }

    #[tokio::test]
    async fn test_plain_dataset_is_lenient_by_default() -> Result<(), DropError> {
        test::run_empty_dir_test_async(|dir| async move {
            let ds = test::init_plain_dataset(dir.join("ds"))?;
            let plain = test::write_txt_file_to_path(ds.path.join("plain.txt"), "hello")?;
            let ctx = DropContext::local().with_cwd(&ds.path);

            let lenient = records(collect(DropOpts::from_paths(&["plain.txt"]), ctx.clone()).await)?;
            assert_eq!(lenient.len(), 1);
            assert_eq!(lenient[0].path, plain);
            assert_eq!(lenient[0].status, DropStatus::NotNeeded);
            assert_eq!(lenient[0].message.as_deref(), Some(NO_CONTENT_STORE_MSG));

            let mut strict_opts = DropOpts::from_paths(&["plain.txt"]);
            strict_opts.no_content_store_is_error = true;
            let strict = records(collect(strict_opts, ctx).await)?;
            assert_eq!(strict[0].status, DropStatus::Impossible);
            Ok(())
        })
        .await
    }

    #[tokio::test]
    async fn test_failed_file_below_directory() -> Result<(), DropError> {
        test::run_empty_dir_test_async(|dir| async move {
            let ds = test::init_plain_dataset(dir.join("ds"))?;
            test::save_dataset(&ds)?;
            let a = test::write_txt_file_to_path(ds.path.join("a.dat"), "a")?;
            let subdir = ds.path.join("subdir");
            let b = test::write_txt_file_to_path(subdir.join("b.dat"), "b")?;

            let store = Arc::new(RecordingStore::new(vec![
                RawOutcome::new(&a, OutcomeCode::Dropped),
                RawOutcome::new(&b, OutcomeCode::Failed("no space".to_string())),
            ]));
            let provider = StaticRepositoryProvider::new().with_store(&ds, store.clone());
            let ctx = DropContext::local()
                .with_provider(Arc::new(provider))
                .with_cwd(&ds.path);

            let mut opts = DropOpts::from_paths(&["a.dat", "subdir"]);
            opts.if_dirty = DirtyPolicy::Ignore;
            let records = records(collect(opts, ctx).await)?;

            let find = |path: &Path| records.iter().find(|r| r.path == path).cloned();
            let a_record = find(&a).unwrap();
            assert_eq!(a_record.status, DropStatus::Ok);
            let dir_record = find(&subdir).unwrap();
            assert_eq!(dir_record.status, DropStatus::Impossible);
            assert_eq!(dir_record.type_, Some(EntryType::Directory));
            assert_eq!(
                dir_record.message,
                Some(format!(
                    "could not drop some content in {} {}",
                    ds,
                    subdir.display()
                ))
            );
            assert_eq!(store.calls(), vec![(vec![a, subdir], DropOptions::Checked)]);
            Ok(())
        })
        .await
    }

    #[tokio::test]
    async fn test_fail_policy_aborts_before_any_drop() -> Result<(), DropError> {
        test::run_empty_dir_test_async(|dir| async move {
            let ds = test::init_plain_dataset(dir.join("ds"))?;
            test::write_txt_file_to_path(ds.path.join("a.dat"), "unsaved")?;
            let store = Arc::new(RecordingStore::new(vec![]));
            let provider = StaticRepositoryProvider::new().with_store(&ds, store.clone());
            let ctx = DropContext::local().with_provider(Arc::new(provider));

            let mut opts = DropOpts::from_paths(&[ds.path.join("a.dat"), ds.path.join("gone")]);
            opts.if_dirty = DirtyPolicy::Fail;
            let items = collect(opts, ctx).await;

            // the missing path is reported before the guard runs
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].as_ref().unwrap().status, DropStatus::NotNeeded);
            assert!(matches!(&items[1], Err(err) if err.is_dirty_dataset()));
            assert!(store.calls().is_empty());
            Ok(())
        })
        .await
    }

    #[tokio::test]
    async fn test_save_before_commits_dirty_datasets_once() -> Result<(), DropError> {
        test::run_empty_dir_test_async(|dir| async move {
            let ds = test::init_dataset(dir.join("ds"))?;
            test::add_annexed_file(&ds, "a.dat", "content").await?;
            assert!(SnapshotState.is_dirty(&ds)?);

            let opts = DropOpts::from_dataset(&ds.path);
            records(collect(opts, DropContext::local()).await)?;

            assert!(!SnapshotState.is_dirty(&ds)?);
            Ok(())
        })
        .await
    }

    #[tokio::test]
    async fn test_every_requested_path_is_reported_once() -> Result<(), DropError> {
        test::run_empty_dir_test_async(|dir| async move {
            let ds = test::init_dataset(dir.join("ds"))?;
            test::add_annexed_file(&ds, "a.dat", "aaa").await?;
            test::add_annexed_file(&ds, "dir/b.dat", "bbb").await?;
            test::add_pointer_file(&ds, "c.dat", "never stored")?;
            test::write_txt_file_to_path(ds.path.join("notes.txt"), "notes")?;
            let outside = test::write_txt_file_to_path(dir.join("outside.txt"), "x")?;

            let requested = vec![
                ds.path.join("a.dat"),
                ds.path.join("dir"),
                ds.path.join("c.dat"),
                ds.path.join("notes.txt"),
                ds.path.join("missing.dat"),
                outside,
            ];
            let mut opts = DropOpts::from_paths(&requested);
            opts.check = false;
            let records = records(collect(opts, DropContext::local()).await)?;

            // files found below a requested directory may add records of their own
            for path in &requested {
                assert_eq!(records.iter().filter(|r| &r.path == path).count(), 1);
            }
            let unique: HashSet<&PathBuf> = records.iter().map(|r| &r.path).collect();
            assert_eq!(unique.len(), records.len());

            let status_of = |path: PathBuf| {
                records
                    .iter()
                    .find(|r| r.path == path)
                    .map(|r| r.status)
            };
            assert_eq!(status_of(ds.path.join("a.dat")), Some(DropStatus::Ok));
            assert_eq!(status_of(ds.path.join("dir")), Some(DropStatus::Ok));
            assert_eq!(status_of(ds.path.join("c.dat")), Some(DropStatus::NotNeeded));
            assert_eq!(status_of(ds.path.join("notes.txt")), Some(DropStatus::NotNeeded));
            assert_eq!(status_of(dir.join("outside.txt")), Some(DropStatus::Impossible));
            assert!(!test::has_local_content(&ds, "aaa"));
            assert!(!test::has_local_content(&ds, "bbb"));
            Ok(())
        })
        .await
    }

    #[tokio::test]
    async fn test_second_run_has_nothing_left_to_drop() -> Result<(), DropError> {
        test::run_empty_dir_test_async(|dir| async move {
            let ds = test::init_dataset(dir.join("ds"))?;
            let a = test::add_annexed_file(&ds, "a.dat", "aaa").await?;
            let mut opts = DropOpts::from_paths(&[&a]);
            opts.check = false;

            let first = records(collect(opts.clone(), DropContext::local()).await)?;
            assert_eq!(first[0].status, DropStatus::Ok);

            let second = records(collect(opts, DropContext::local()).await)?;
            assert_eq!(second.len(), 1);
            assert_eq!(second[0].status, DropStatus::NotNeeded);
            assert_eq!(
                second[0].message,
                Some(format!("nothing to drop from {}", a.display()))
            );
            Ok(())
        })
        .await
    }

    #[tokio::test]
    async fn test_broken_dataset_does_not_stop_the_others() -> Result<(), DropError> {
        test::run_empty_dir_test_async(|dir| async move {
            let broken = test::init_plain_dataset(dir.join("broken"))?;
            let fine = test::init_plain_dataset(dir.join("fine"))?;
            let x = test::write_txt_file_to_path(broken.path.join("x.dat"), "x")?;
            let y = test::write_txt_file_to_path(fine.path.join("y.dat"), "y")?;
            let provider = StaticRepositoryProvider::new().with_broken(&broken);
            let ctx = DropContext::local().with_provider(Arc::new(provider));

            let mut opts = DropOpts::from_paths(&[&x, &y]);
            opts.if_dirty = DirtyPolicy::Ignore;
            let records = records(collect(opts, ctx).await)?;

            assert_eq!(records.len(), 2);
            assert_eq!(records[0].path, x);
            assert_eq!(records[0].status, DropStatus::Error);
            assert_eq!(records[1].path, y);
            assert_eq!(records[1].status, DropStatus::NotNeeded);
            Ok(())
        })
        .await
    }

    #[tokio::test]
    async fn test_unknown_reference_dataset_aborts() -> Result<(), DropError> {
        test::run_empty_dir_test_async(|dir| async move {
            let opts = DropOpts::from_dataset(dir.join("nope"));
            let items = collect(opts, DropContext::local()).await;
            assert_eq!(items.len(), 1);
            assert!(matches!(items[0], Err(DropError::DatasetNotFound(_))));
            Ok(())
        })
        .await
    }

    #[tokio::test]
    async fn test_stopping_early_skips_datasets_not_yet_reached() -> Result<(), DropError> {
        test::run_empty_dir_test_async(|dir| async move {
            let one = test::init_dataset(dir.join("one"))?;
            let two = test::init_dataset(dir.join("two"))?;
            test::add_annexed_file(&one, "a.dat", "first").await?;
            test::add_annexed_file(&two, "b.dat", "second").await?;

            let mut opts = DropOpts::from_paths(&[&one.path, &two.path]);
            opts.check = false;
            opts.if_dirty = DirtyPolicy::Ignore;

            let first = {
                let mut records = run(opts, DropContext::local().with_cwd(&dir));
                records.next().await
            };

            let first = match first {
                Some(item) => item?,
                None => return Err(DropError::basic_str("stream ended before any record")),
            };
            assert!(first.path.starts_with(&one.path));
            assert_eq!(first.status, DropStatus::Ok);
            // dropped content stays dropped, the second dataset was never touched
            assert!(!test::has_local_content(&one, "first"));
            assert!(test::has_local_content(&two, "second"));
            Ok(())
        })
        .await
    }
}

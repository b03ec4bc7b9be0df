use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytesize::ByteSize;
use tokio::fs;

use crate::constants::{DEFAULT_MIN_COPIES, LOCAL_STORAGE_TYPE, VERSION_FILE_NAME};
use crate::error::DropError;
use crate::storage::pointer::{PointerFile, PointerRead};
use crate::storage::{ContentStore, DropOptions, OutcomeCode, RawOutcome};
use crate::util;

/// Content store backed by version directories on the local filesystem.
///
/// Files in the working tree are pointer files, their payload lives at
/// `<root>/<hash[..2]>/<hash[2..]>/data`. Remotes are other version stores
/// with the same layout, they only count copies and are never written to.
#[derive(Debug)]
pub struct LocalContentStore {
    /// Root of the dataset this store belongs to
    dataset_root: PathBuf,
    /// Root path where versions are stored
    root_path: PathBuf,
    min_copies: usize,
    remotes: Vec<PathBuf>,
}

/// Get the directory containing a version file inside any version store
fn version_dir(root: &Path, hash: &str) -> PathBuf {
    let topdir = &hash[..2];
    let subdir = &hash[2..];
    root.join(topdir).join(subdir)
}

impl LocalContentStore {
    /// Create a new LocalContentStore
    ///
    /// # Arguments
    /// * `dataset_root` - Root of the dataset whose files the store manages
    /// * `root_path` - Base directory for version storage
    pub fn new(dataset_root: impl AsRef<Path>, root_path: impl AsRef<Path>) -> Self {
        Self {
            dataset_root: dataset_root.as_ref().to_path_buf(),
            root_path: root_path.as_ref().to_path_buf(),
            min_copies: DEFAULT_MIN_COPIES,
            remotes: Vec::new(),
        }
    }

    pub fn with_min_copies(mut self, min_copies: usize) -> Self {
        self.min_copies = min_copies;
        self
    }

    pub fn with_remotes(mut self, remotes: Vec<PathBuf>) -> Self {
        self.remotes = remotes
            .into_iter()
            .map(|remote| util::fs::absolute_path(remote, &self.dataset_root))
            .collect();
        self
    }

    fn version_path(&self, hash: &str) -> PathBuf {
        version_dir(&self.root_path, hash).join(VERSION_FILE_NAME)
    }

    pub async fn init(&self) -> Result<(), DropError> {
        if !self.root_path.exists() {
            fs::create_dir_all(&self.root_path).await?;
        }
        Ok(())
    }

    pub async fn store_version(&self, hash: &str, data: &[u8]) -> Result<(), DropError> {
        fs::create_dir_all(version_dir(&self.root_path, hash)).await?;

        let version_path = self.version_path(hash);
        if !version_path.exists() {
            fs::write(&version_path, data).await?;
        }
        Ok(())
    }

    pub fn version_exists(&self, hash: &str) -> bool {
        self.version_path(hash).exists()
    }

    pub async fn delete_version(&self, hash: &str) -> Result<(), DropError> {
        let version_dir = version_dir(&self.root_path, hash);
        if version_dir.exists() {
            fs::remove_dir_all(&version_dir).await?;
        }
        Ok(())
    }

    /// Number of remotes that hold a copy of `hash`
    pub fn remote_copies(&self, hash: &str) -> usize {
        self.remotes
            .iter()
            .filter(|remote| version_dir(remote, hash).join(VERSION_FILE_NAME).is_file())
            .count()
    }

    /// Every file below the requested paths, once, in request order
    fn expand(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>, DropError> {
        let mut seen = HashSet::new();
        let mut files = Vec::new();
        for path in paths {
            if !util::fs::path_exists(path) {
                log::debug!("LocalContentStore skipping missing path {path:?}");
                continue;
            }
            for file in util::fs::walk_dataset_files(path)? {
                if seen.insert(file.clone()) {
                    files.push(file);
                }
            }
        }
        Ok(files)
    }

    async fn drop_version(&self, hash: &str, opts: DropOptions) -> OutcomeCode {
        if !opts.is_force() {
            let found = self.remote_copies(hash);
            if found < self.min_copies {
                return OutcomeCode::InsufficientCopies {
                    found,
                    required: self.min_copies,
                };
            }
        }

        match self.delete_version(hash).await {
            Ok(()) => OutcomeCode::Dropped,
            Err(err) => OutcomeCode::Failed(format!("could not remove content {hash}: {err}")),
        }
    }
}

#[async_trait]
impl ContentStore for LocalContentStore {
    async fn drop_content(
        &self,
        paths: &[PathBuf],
        opts: DropOptions,
    ) -> Result<Vec<RawOutcome>, DropError> {
        let files = self.expand(paths)?;
        log::debug!(
            "LocalContentStore::drop_content {} file(s) under {:?} ({:?})",
            files.len(),
            self.dataset_root,
            opts
        );

        let mut outcomes = Vec::new();
        // Presence is decided before anything is removed, so files that
        // share a payload all report the same outcome.
        let mut by_hash: Vec<(String, u64, Vec<PathBuf>)> = Vec::new();
        let mut hash_idx: HashMap<String, usize> = HashMap::new();
        for file in files {
            match PointerFile::read(&file) {
                Ok(PointerRead::NotPointer) => {}
                Ok(PointerRead::Malformed) => {
                    outcomes.push(RawOutcome::new(
                        &file,
                        OutcomeCode::Unsupported("malformed pointer file".to_string()),
                    ));
                }
                Ok(PointerRead::Pointer(pointer)) => {
                    if !self.version_exists(&pointer.oid) {
                        continue;
                    }
                    match hash_idx.get(&pointer.oid) {
                        Some(idx) => by_hash[*idx].2.push(file),
                        None => {
                            hash_idx.insert(pointer.oid.clone(), by_hash.len());
                            by_hash.push((pointer.oid, pointer.size, vec![file]));
                        }
                    }
                }
                Err(err) => {
                    outcomes.push(RawOutcome::new(
                        &file,
                        OutcomeCode::Failed(format!("could not read pointer: {err}")),
                    ));
                }
            }
        }

        let mut freed: u64 = 0;
        for (hash, size, files) in by_hash {
            let code = self.drop_version(&hash, opts).await;
            if code == OutcomeCode::Dropped {
                freed = freed.saturating_add(size);
            }
            for file in files {
                outcomes.push(RawOutcome::new(file, code.clone()));
            }
        }

        log::debug!(
            "LocalContentStore freed {} in {:?}",
            ByteSize::b(freed),
            self.root_path
        );
        Ok(outcomes)
    }

    fn is_tracked(&self, path: &Path) -> Result<bool, DropError> {
        if !path.is_file() {
            return Ok(false);
        }
        Ok(!matches!(PointerFile::read(path)?, PointerRead::NotPointer))
    }

    fn storage_type(&self) -> &str {
        LOCAL_STORAGE_TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test;

    #[tokio::test]
    async fn test_checked_drop_needs_enough_remote_copies() -> Result<(), DropError> {
        test::run_empty_dir_test_async(|dir| async move {
            let ds = test::init_dataset(dir.join("ds"))?;
            let remote = dir.join("remote");
            let store = LocalContentStore::new(&ds.path, test::versions_dir(&ds))
                .with_min_copies(1)
                .with_remotes(vec![remote.clone()]);

            let kept = test::add_annexed_file(&ds, "kept.dat", "no copies elsewhere").await?;
            let backed_up = test::add_annexed_file(&ds, "backed_up.dat", "one copy elsewhere").await?;
            test::add_remote_copy(&remote, "one copy elsewhere").await?;

            let mut outcomes = store
                .drop_content(&[ds.path.clone()], DropOptions::Checked)
                .await?;
            outcomes.sort_by(|a, b| a.path.cmp(&b.path));

            assert_eq!(
                outcomes,
                vec![
                    RawOutcome::new(&backed_up, OutcomeCode::Dropped),
                    RawOutcome::new(
                        &kept,
                        OutcomeCode::InsufficientCopies {
                            found: 0,
                            required: 1
                        }
                    ),
                ]
            );
            Ok(())
        })
        .await
    }

    #[tokio::test]
    async fn test_force_drop_ignores_copies_and_is_silent_the_second_time() -> Result<(), DropError>
    {
        test::run_empty_dir_test_async(|dir| async move {
            let ds = test::init_dataset(dir.join("ds"))?;
            let store = LocalContentStore::new(&ds.path, test::versions_dir(&ds)).with_min_copies(3);
            let file = test::add_annexed_file(&ds, "a.dat", "payload").await?;

            let outcomes = store
                .drop_content(&[file.clone()], DropOptions::Force)
                .await?;
            assert_eq!(outcomes, vec![RawOutcome::new(&file, OutcomeCode::Dropped)]);

            let again = store.drop_content(&[file.clone()], DropOptions::Force).await?;
            assert!(again.is_empty());
            // pointer stays in the working tree
            assert!(store.is_tracked(&file)?);
            Ok(())
        })
        .await
    }

    #[tokio::test]
    async fn test_shared_payload_reports_every_file() -> Result<(), DropError> {
        test::run_empty_dir_test_async(|dir| async move {
            let ds = test::init_dataset(dir.join("ds"))?;
            let store = LocalContentStore::new(&ds.path, test::versions_dir(&ds));
            let first = test::add_annexed_file(&ds, "one.dat", "same").await?;
            let second = test::add_annexed_file(&ds, "two.dat", "same").await?;

            let outcomes = store
                .drop_content(&[ds.path.clone()], DropOptions::Force)
                .await?;
            assert_eq!(
                outcomes,
                vec![
                    RawOutcome::new(&first, OutcomeCode::Dropped),
                    RawOutcome::new(&second, OutcomeCode::Dropped),
                ]
            );
            Ok(())
        })
        .await
    }

    #[tokio::test]
    async fn test_plain_and_malformed_files() -> Result<(), DropError> {
        test::run_empty_dir_test_async(|dir| async move {
            let ds = test::init_dataset(dir.join("ds"))?;
            let store = LocalContentStore::new(&ds.path, test::versions_dir(&ds));
            let plain = ds.path.join("notes.txt");
            test::write_txt_file_to_path(&plain, "plain text")?;
            let broken = ds.path.join("broken.dat");
            test::write_txt_file_to_path(&broken, "version https://datadrop.dev/spec/v1\nnope\n")?;

            assert!(!store.is_tracked(&plain)?);
            assert!(store.is_tracked(&broken)?);
            assert!(!store.is_tracked(&ds.path)?);

            let outcomes = store
                .drop_content(&[plain, broken.clone()], DropOptions::Force)
                .await?;
            assert_eq!(
                outcomes,
                vec![RawOutcome::new(
                    &broken,
                    OutcomeCode::Unsupported("malformed pointer file".to_string())
                )]
            );
            Ok(())
        })
        .await
    }

    #[tokio::test]
    async fn test_huge_pointer_sizes_do_not_overflow_the_freed_total() -> Result<(), DropError> {
        test::run_empty_dir_test_async(|dir| async move {
            let ds = test::init_dataset(dir.join("ds"))?;
            let store = LocalContentStore::new(&ds.path, test::versions_dir(&ds));
            store.init().await?;

            let mut files = Vec::new();
            for (name, contents) in [("one.dat", "first payload"), ("two.dat", "second payload")] {
                let hash = util::hasher::hash_buffer(contents.as_bytes());
                store.store_version(&hash, contents.as_bytes()).await?;
                let pointer = PointerFile::new(&hash, u64::MAX);
                files.push(test::write_txt_file_to_path(ds.path.join(name), pointer.to_string())?);
            }

            let mut outcomes = store
                .drop_content(&[ds.path.clone()], DropOptions::Force)
                .await?;
            outcomes.sort_by(|a, b| a.path.cmp(&b.path));

            assert_eq!(
                outcomes,
                vec![
                    RawOutcome::new(&files[0], OutcomeCode::Dropped),
                    RawOutcome::new(&files[1], OutcomeCode::Dropped),
                ]
            );
            assert!(!test::has_local_content(&ds, "first payload"));
            assert!(!test::has_local_content(&ds, "second payload"));
            Ok(())
        })
        .await
    }
}

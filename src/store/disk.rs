// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Disk-based transaction store with versioning and atomic writes

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{check_invariants, merge_records, AppendOutcome, StoreStats, TransactionStore};
use crate::errors::StoreError;
use crate::types::cache::{CacheKey, Direction};
use crate::types::transaction::Transaction;

/// Current store format version
const STORE_VERSION: u32 = 1;

/// Serialized store format (versioned)
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    /// Store format version
    version: u32,
    /// Tracked address, checked against the cache key on load
    address: Address,
    /// Tracked direction, checked against the cache key on load
    direction: Direction,
    /// Records sorted by marker
    transactions: Vec<Transaction>,
}

impl StoreFile {
    fn new(key: &CacheKey, transactions: Vec<Transaction>) -> Self {
        Self {
            version: STORE_VERSION,
            address: key.address(),
            direction: key.direction(),
            transactions,
        }
    }
}

/// Disk-based transaction store
///
/// Persists each cache key as `<base_dir>/<address>-<direction>.json`:
/// - Versioned format, validated on load (version, key, ordering, uniqueness)
/// - Atomic writes: temp file, `fsync`, then rename over the old file
/// - Explicit base directory; nothing is derived from global state
///
/// # Examples
///
/// ```rust,ignore
/// use petroscan::DiskStore;
///
/// let store = DiskStore::new("/var/cache/petroscan").validate()?;
/// ```
///
/// # Concurrency
///
/// Operations are serialized within a process. There is no cross-process
/// locking: a cache key must only be written by one process at a time.
#[derive(Debug)]
pub struct DiskStore {
    base_dir: PathBuf,
    state: Mutex<StoreStats>,
}

impl DiskStore {
    /// Creates a new disk store rooted at `base_dir`
    ///
    /// The directory is created on the first write. Use
    /// [`validate()`](Self::validate) to check it immediately.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            state: Mutex::new(StoreStats::default()),
        }
    }

    /// Creates the base directory if needed and checks that it is writable
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the directory cannot be created or written.
    pub fn validate(self) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            StoreError::write(
                self.base_dir.display().to_string(),
                "failed to create store directory",
                Some(Box::new(e)),
            )
        })?;

        let test_file = self.base_dir.join(".store_write_test");
        std::fs::write(&test_file, b"test").map_err(|e| {
            StoreError::write(
                self.base_dir.display().to_string(),
                "store directory is not writable",
                Some(Box::new(e)),
            )
        })?;
        let _ = std::fs::remove_file(&test_file);

        debug!(path = %self.base_dir.display(), "Store directory validated successfully");
        Ok(self)
    }

    /// Directory holding the store files
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// File backing `key`
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.base_dir.join(format!("{}.json", key.file_stem()))
    }

    async fn read(&self, key: &CacheKey) -> Result<Vec<Transaction>, StoreError> {
        let path = self.path_for(key);
        let shown = path.display().to_string();

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %shown, "Store file does not exist, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(StoreError::corrupt(
                    shown,
                    "failed to read store file",
                    Some(Box::new(e)),
                ))
            }
        };

        let file: StoreFile = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::corrupt(&shown, "failed to parse store file", Some(Box::new(e))))?;

        if file.version != STORE_VERSION {
            return Err(StoreError::corrupt(
                shown,
                format!(
                    "unsupported store version {} (expected {})",
                    file.version, STORE_VERSION
                ),
                None,
            ));
        }

        if file.address != key.address() || file.direction != key.direction() {
            return Err(StoreError::corrupt(
                shown,
                format!(
                    "store belongs to {:#x}:{}, not {}",
                    file.address, file.direction, key
                ),
                None,
            ));
        }

        check_invariants(&file.transactions)
            .map_err(|details| StoreError::corrupt(&shown, details, None))?;

        Ok(file.transactions)
    }

    async fn write(&self, key: &CacheKey, transactions: Vec<Transaction>) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let shown = path.display().to_string();
        let count = transactions.len();

        // Serialize before touching the file system
        let json = serde_json::to_vec_pretty(&StoreFile::new(key, transactions))
            .map_err(|e| StoreError::write(&shown, "failed to serialize store", Some(Box::new(e))))?;

        tokio::fs::create_dir_all(&self.base_dir).await.map_err(|e| {
            StoreError::write(
                self.base_dir.display().to_string(),
                "failed to create store directory",
                Some(Box::new(e)),
            )
        })?;

        let temp_path = path.with_extension("json.tmp");
        let write_temp = async {
            let mut file = tokio::fs::File::create(&temp_path).await?;
            file.write_all(&json).await?;
            file.sync_all().await
        };
        write_temp.await.map_err(|e| {
            StoreError::write(
                temp_path.display().to_string(),
                "failed to write temp store file",
                Some(Box::new(e)),
            )
        })?;

        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StoreError::write(
                &shown,
                format!("failed to rename '{}' into place", temp_path.display()),
                Some(Box::new(e)),
            )
        })?;

        debug!(path = %shown, transactions = count, "Saved transaction store");
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for DiskStore {
    async fn load(&self, key: &CacheKey) -> Result<Vec<Transaction>, StoreError> {
        let mut stats = self.state.lock().await;
        let transactions = self.read(key).await?;
        stats.loads += 1;

        info!(
            key = %key,
            transactions = transactions.len(),
            "Loaded transaction store"
        );
        Ok(transactions)
    }

    async fn append(
        &self,
        key: &CacheKey,
        records: &[Transaction],
    ) -> Result<AppendOutcome, StoreError> {
        let mut stats = self.state.lock().await;

        let mut transactions = self.read(key).await?;
        let outcome = merge_records(&mut transactions, records);
        stats.duplicates_skipped += outcome.duplicates as u64;

        if outcome.appended == 0 {
            debug!(key = %key, duplicates = outcome.duplicates, "Nothing new to append");
            return Ok(outcome);
        }

        self.write(key, transactions).await?;
        stats.writes += 1;
        stats.appended += outcome.appended as u64;

        Ok(outcome)
    }

    async fn initialize(&self, key: &CacheKey) -> Result<(), StoreError> {
        let mut stats = self.state.lock().await;
        let path = self.path_for(key);

        let exists = tokio::fs::try_exists(&path).await.map_err(|e| {
            StoreError::corrupt(
                path.display().to_string(),
                "failed to inspect store file",
                Some(Box::new(e)),
            )
        })?;
        if exists {
            return Ok(());
        }

        debug!(key = %key, path = %path.display(), "Creating empty transaction store");
        self.write(key, Vec::new()).await?;
        stats.writes += 1;
        Ok(())
    }

    async fn stats(&self) -> StoreStats {
        self.state.lock().await.clone()
    }

    fn name(&self) -> &'static str {
        "DiskStore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::tx;
    use crate::types::transaction::Marker;
    use tempfile::TempDir;

    fn key() -> CacheKey {
        CacheKey::new(Address::repeat_byte(0xaa), Direction::Sent)
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskStore::new(temp_dir.path());

        assert!(store.load(&key()).await.unwrap().is_empty());
        assert_eq!(store.last_known_marker(&key()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_append_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();

        {
            let store = DiskStore::new(temp_dir.path());
            store
                .append(&key(), &[tx(1, 100, 0), tx(2, 101, 4)])
                .await
                .unwrap();
        }

        let store = DiskStore::new(temp_dir.path());
        let loaded = store.load(&key()).await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(
            store.last_known_marker(&key()).await.unwrap(),
            Some(Marker::new(101, 4))
        );
    }

    #[tokio::test]
    async fn test_duplicate_append_does_not_write() {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskStore::new(temp_dir.path());

        store.append(&key(), &[tx(1, 100, 0)]).await.unwrap();
        let before = std::fs::read(store.path_for(&key())).unwrap();

        let outcome = store.append(&key(), &[tx(1, 100, 0)]).await.unwrap();
        assert_eq!(outcome.appended, 0);
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(std::fs::read(store.path_for(&key())).unwrap(), before);

        let stats = store.stats().await;
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.duplicates_skipped, 1);
    }

    #[tokio::test]
    async fn test_initialize_creates_valid_empty_file_once() {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskStore::new(temp_dir.path().join("nested"));

        store.initialize(&key()).await.unwrap();
        assert!(store.path_for(&key()).exists());
        assert!(store.load(&key()).await.unwrap().is_empty());

        store.append(&key(), &[tx(1, 5, 0)]).await.unwrap();
        store.initialize(&key()).await.unwrap();
        assert_eq!(store.load(&key()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_initialize_surfaces_uninspectable_path() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the store directory should be
        let base = temp_dir.path().join("not-a-dir");
        std::fs::write(&base, b"").unwrap();
        let store = DiskStore::new(&base);

        let err = store.initialize(&key()).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert_eq!(store.stats().await.writes, 0);
    }

    #[tokio::test]
    async fn test_unparseable_file_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskStore::new(temp_dir.path());
        std::fs::write(store.path_for(&key()), b"{ not json").unwrap();

        let err = store.load(&key()).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_version_mismatch_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskStore::new(temp_dir.path());
        store.initialize(&key()).await.unwrap();

        let path = store.path_for(&key());
        let mut json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        json["version"] = serde_json::json!(99);
        std::fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

        let err = store.load(&key()).await.unwrap_err();
        assert!(err.to_string().contains("unsupported store version 99"));
    }

    #[tokio::test]
    async fn test_foreign_key_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskStore::new(temp_dir.path());
        let received = CacheKey::new(key().address(), Direction::Received);
        store.initialize(&received).await.unwrap();

        std::fs::copy(store.path_for(&received), store.path_for(&key())).unwrap();

        let err = store.load(&key()).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_store_rejects_append() {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskStore::new(temp_dir.path());
        std::fs::write(store.path_for(&key()), b"[]").unwrap();

        assert!(store.append(&key(), &[tx(1, 1, 0)]).await.is_err());
        assert_eq!(std::fs::read(store.path_for(&key())).unwrap(), b"[]");
    }

    #[tokio::test]
    async fn test_validation_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("a").join("b");

        let store = DiskStore::new(&base).validate();
        assert!(store.is_ok());
        assert!(base.is_dir());
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let store = DiskStore::new(temp_dir.path());
        store.append(&key(), &[tx(1, 1, 0)]).await.unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}

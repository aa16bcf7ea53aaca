//! File-backed document store
//!
//! The whole store is kept in memory and written as one snapshot after
//! every successful mutation. Snapshot layout:
//!
//! ```text
//! <store image as pretty JSON>
//! #crc32=<8 lowercase hex digits of the CRC32 of the JSON bytes>
//! ```
//!
//! Writes go to `<path>.tmp`, are synced, and are renamed over the
//! snapshot. A mutation is applied to a copy of the store and kept only
//! after its snapshot is on disk, so a failed write changes nothing.
//! Operations that change nothing (an existing collection or index) do not
//! rewrite the file.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::index::{IndexOutcome, IndexSpec};
use crate::schema::CollectionSchema;

use super::checksum::{compute_checksum, verify_checksum};
use super::errors::{StoreError, StoreResult};
use super::memory::{MemoryStore, StoreImage};
use super::{CollectionOutcome, DocumentStore};

const CHECKSUM_PREFIX: &str = "#crc32=";

/// Document store persisted to a single snapshot file
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Opens the store at `path`.
    ///
    /// A missing file yields an empty store; the file is created on the
    /// first mutation. The parent directory must exist.
    ///
    /// # Errors
    ///
    /// - `StoreError::Open` if the location is unusable or unreadable
    /// - `StoreError::Corrupt` if the checksum or contents do not verify
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(open_error(&path, "parent directory does not exist"));
            }
        }

        if !path.exists() {
            return Ok(Self {
                path,
                inner: MemoryStore::new(),
            });
        }

        if !path.is_file() {
            return Err(open_error(&path, "not a regular file"));
        }

        let content = fs::read_to_string(&path).map_err(|e| open_error(&path, e.to_string()))?;
        let image = decode_snapshot(&path, &content)?;
        let inner = MemoryStore::from_image(image).map_err(|e| corrupt(&path, e.to_string()))?;

        Ok(Self { path, inner })
    }

    /// Returns the snapshot path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `store` as the new snapshot: temp file, fsync, rename, fsync
    /// of the parent directory.
    fn persist(&self, store: &MemoryStore) -> StoreResult<()> {
        let body = serde_json::to_string_pretty(&store.to_image())
            .map_err(|e| corrupt(&self.path, format!("cannot encode snapshot: {}", e)))?;
        let snapshot = format!(
            "{}\n{}{:08x}\n",
            body,
            CHECKSUM_PREFIX,
            compute_checksum(body.as_bytes())
        );

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp)?;
        file.write_all(snapshot.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &self.path)?;

        if let Some(parent) = self.path.parent() {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }
        Ok(())
    }

    /// Applies `change` to a copy of the store and keeps the copy only once
    /// its snapshot is on disk. `change` reports whether anything changed;
    /// unchanged copies are dropped without a write.
    fn commit<T, F>(&mut self, change: F) -> StoreResult<T>
    where
        F: FnOnce(&mut MemoryStore) -> StoreResult<(T, bool)>,
    {
        let mut next = self.inner.clone();
        let (result, changed) = change(&mut next)?;
        if changed {
            self.persist(&next)?;
            self.inner = next;
        }
        Ok(result)
    }
}

fn decode_snapshot(path: &Path, content: &str) -> StoreResult<StoreImage> {
    let trimmed = content.trim_end_matches('\n');
    let (body, trailer) = trimmed
        .rsplit_once('\n')
        .ok_or_else(|| corrupt(path, "missing checksum trailer"))?;

    let expected = trailer
        .strip_prefix(CHECKSUM_PREFIX)
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        .ok_or_else(|| corrupt(path, "malformed checksum trailer"))?;

    if !verify_checksum(body.as_bytes(), expected) {
        return Err(corrupt(path, "checksum mismatch"));
    }

    serde_json::from_str(body).map_err(|e| corrupt(path, format!("invalid JSON: {}", e)))
}

fn open_error(path: &Path, reason: impl Into<String>) -> StoreError {
    StoreError::Open {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

fn corrupt(path: &Path, reason: impl Into<String>) -> StoreError {
    StoreError::Corrupt {
        path: path.display().to_string(),
        reason: reason.into(),
    }
}

impl DocumentStore for FileStore {
    fn create_collection(&mut self, schema: CollectionSchema) -> StoreResult<CollectionOutcome> {
        if let Some(existing) = self.inner.schema(&schema.collection) {
            if *existing == schema {
                return Ok(CollectionOutcome::AlreadyExists);
            }
        }
        self.commit(|store| {
            let outcome = store.create_collection(schema)?;
            Ok((outcome, outcome == CollectionOutcome::Created))
        })
    }

    fn create_index(&mut self, collection: &str, spec: IndexSpec) -> StoreResult<IndexOutcome> {
        let exists = self
            .inner
            .indexes(collection)
            .map_or(false, |indexes| indexes.iter().any(|i| *i == spec));
        if exists {
            return Ok(IndexOutcome::AlreadyExists);
        }
        self.commit(|store| {
            let outcome = store.create_index(collection, spec)?;
            Ok((outcome, outcome == IndexOutcome::Created))
        })
    }

    fn insert(&mut self, collection: &str, document: Value) -> StoreResult<Value> {
        self.commit(|store| Ok((store.insert(collection, document)?, true)))
    }

    fn collection_names(&self) -> Vec<String> {
        self.inner.collection_names()
    }

    fn schema(&self, collection: &str) -> Option<&CollectionSchema> {
        self.inner.schema(collection)
    }

    fn indexes(&self, collection: &str) -> Option<Vec<IndexSpec>> {
        self.inner.indexes(collection)
    }

    fn count(&self, collection: &str) -> StoreResult<usize> {
        self.inner.count(collection)
    }

    fn find_eq(&self, collection: &str, field: &str, value: &Value) -> StoreResult<Vec<Value>> {
        self.inner.find_eq(collection, field, value)
    }
}

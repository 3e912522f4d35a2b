//! A JSON file-backed implementation of the [`RecordStore`][super::RecordStore] trait.
//!
//! Wraps a [`InMemoryRecordStore`][super::memory::InMemoryRecordStore] instance, persisting
//! every change to a JSON file on disk that can be reloaded across restarts.
//!
//! Changes are applied to a copy of the records, written to a temporary file that is renamed
//! over the state file, and only then made visible in memory. A failed write leaves both the
//! file and the in-memory records as they were. Each change runs in its own task, so a caller
//! that is cancelled mid-write can't leave memory and disk out of step.
use crate::error::StoreError;
use crate::record_store::memory::{self, InMemoryRecordStore, RecordMap};
use crate::record_store::{DnsRecord, Lookup, ObjectKey, RecordStore};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Default, Serialize, Deserialize)]
struct State {
    records: Vec<DnsRecord>,
}

/// A file-backed record store. After each change the JSON file on disk is replaced with the
/// full set of records.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct FileRecordStore {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    records: InMemoryRecordStore,
    path: PathBuf,
    // Serializes stage-write-commit so no change is built on a stale copy.
    write_lock: Mutex<()>,
}

impl FileRecordStore {
    /// Load a [`FileRecordStore`] from the JSON state located at the given path. A missing file
    /// is created with an empty state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidJSON`] if the state file is invalid.
    ///
    /// Returns [`StoreError::IO`] if the path can't be opened, created or read.
    pub async fn try_from_file(p: &str) -> Result<Self, StoreError> {
        let path = PathBuf::from(p);
        let state: State = match File::open(&path).await {
            Ok(mut f) => {
                let mut buf = vec![];
                f.read_to_end(&mut buf).await?;
                serde_json::from_slice(&buf)?
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                write_state(&path, Vec::new()).await?;
                State::default()
            }
            Err(err) => return Err(StoreError::IO(err)),
        };

        tracing::debug!("loaded {} records from {p}", state.records.len());
        Ok(Self {
            inner: Arc::new(Inner {
                records: InMemoryRecordStore::from_records(state.records),
                path,
                write_lock: Mutex::default(),
            }),
        })
    }

    async fn commit<T, F>(&self, change: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut RecordMap) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.commit(change).await })
            .await
            .map_err(|err| StoreError::IO(std::io::Error::new(ErrorKind::Other, err)))?
    }
}

impl Inner {
    async fn commit<T>(
        &self,
        change: impl FnOnce(&mut RecordMap) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut staged = self.records.map().read().await.clone();
        let out = change(&mut staged)?;
        write_state(&self.path, memory::sorted(&staged)).await?;
        *self.records.map().write().await = staged;
        Ok(out)
    }
}

/// Atomically replace the state file at `path` with `records`.
async fn write_state(path: &Path, records: Vec<DnsRecord>) -> Result<(), StoreError> {
    let data = serde_json::to_vec_pretty(&State { records })?;
    let tmp = temp_path(path);
    let res = async {
        let mut output_file = File::create(&tmp).await?;
        output_file.write_all(&data).await?;
        output_file.sync_all().await?;
        tokio::fs::rename(&tmp, path).await
    }
    .await;
    if res.is_err() {
        let _ = tokio::fs::remove_file(&tmp).await;
    }
    Ok(res?)
}

// Same directory as the target, so the rename never crosses filesystems.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "records".into(), |n| n.to_string_lossy());
    path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4()))
}

#[async_trait::async_trait]
impl RecordStore for FileRecordStore {
    async fn get(&self, key: &ObjectKey) -> Result<Lookup, StoreError> {
        self.inner.records.get(key).await
    }

    async fn create(&self, record: DnsRecord) -> Result<DnsRecord, StoreError> {
        self.commit(move |records| memory::create_in(records, record))
            .await
    }

    async fn update(&self, record: DnsRecord) -> Result<DnsRecord, StoreError> {
        self.commit(move |records| memory::update_in(records, record))
            .await
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError> {
        let key = key.clone();
        self.commit(move |records| memory::delete_in(records, &key))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_store::{RecordSpec, TXT};
    use std::collections::HashMap;
    use std::time::Duration;

    fn record() -> DnsRecord {
        record_named("acme-example-com")
    }

    fn record_named(name: &str) -> DnsRecord {
        DnsRecord::new(
            ObjectKey::new("default", name),
            HashMap::from([("app".to_string(), "web".to_string())]),
            RecordSpec {
                name: "example.com".to_string(),
                record_type: TXT.to_string(),
                value: "abc123".to_string(),
                extra: HashMap::new(),
            },
        )
    }

    #[tokio::test]
    async fn missing_file_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let path = path.to_str().unwrap();

        let store = FileRecordStore::try_from_file(path).await.unwrap();
        assert!(store.inner.records.is_empty().await);
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("\"records\": []"));
    }

    #[tokio::test]
    async fn state_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let path = path.to_str().unwrap();

        let created = {
            let store = FileRecordStore::try_from_file(path).await.unwrap();
            store.create(record()).await.unwrap()
        };

        let reloaded = FileRecordStore::try_from_file(path).await.unwrap();
        assert_eq!(
            reloaded.get(&created.key()).await.unwrap(),
            Lookup::Found(created.clone())
        );

        reloaded.delete(&created.key()).await.unwrap();
        let reloaded = FileRecordStore::try_from_file(path).await.unwrap();
        assert_eq!(
            reloaded.get(&created.key()).await.unwrap(),
            Lookup::NotFound
        );
    }

    #[tokio::test]
    async fn failed_write_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let path = path.to_str().unwrap();

        let store = FileRecordStore::try_from_file(path).await.unwrap();
        store.create(record()).await.unwrap();
        let before = std::fs::read_to_string(path).unwrap();

        assert!(store.create(record()).await.is_err());
        assert_eq!(std::fs::read_to_string(path).unwrap(), before);
    }

    #[tokio::test]
    async fn dropped_write_never_corrupts_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let path = path.to_str().unwrap();

        for i in 0..100u64 {
            let store = FileRecordStore::try_from_file(path).await.unwrap();
            let create = store.create(record_named(&format!("acme-{i}")));
            let _ = tokio::time::timeout(Duration::from_micros(i * 20), create).await;
            if let Err(err) = FileRecordStore::try_from_file(path).await {
                panic!("iteration {i}: reload failed: {err:?}");
            }
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
        FileRecordStore::try_from_file(path).await.unwrap();
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test]
    async fn abandoned_write_still_lands() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let path = path.to_str().unwrap();

        let store = FileRecordStore::try_from_file(path).await.unwrap();
        let res = tokio::time::timeout(Duration::ZERO, store.create(record())).await;
        assert!(res.is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(matches!(
            store.get(&record().key()).await.unwrap(),
            Lookup::Found(_)
        ));
        let reloaded = FileRecordStore::try_from_file(path).await.unwrap();
        assert!(matches!(
            reloaded.get(&record().key()).await.unwrap(),
            Lookup::Found(_)
        ));
    }

    #[tokio::test]
    async fn failed_save_keeps_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        let path_str = path.to_str().unwrap();

        let store = FileRecordStore::try_from_file(path_str).await.unwrap();
        let existing = store.create(record_named("acme-existing")).await.unwrap();

        // A directory can't be replaced by a file, so every save fails from here on.
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let err = store.create(record()).await.unwrap_err();
        assert!(matches!(err, StoreError::IO(_)));
        assert_eq!(store.get(&record().key()).await.unwrap(), Lookup::NotFound);

        let mut changed = existing.clone();
        changed.spec.value = "changed".to_string();
        assert!(store.update(changed).await.is_err());
        assert!(store.delete(&existing.key()).await.is_err());
        assert_eq!(
            store.get(&existing.key()).await.unwrap(),
            Lookup::Found(existing)
        );

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1, "temporary files are cleaned up");
    }
}

//! Declarative DNS record storage.
//!
//! A [`DnsRecord`] is a namespaced, named resource describing one DNS record that some
//! downstream system is expected to publish. The [solver][crate::solver] only needs four
//! operations against it, captured by the [`RecordStore`] trait: get, create, update and delete.
//!
//! Two implementations are provided, [`memory::InMemoryRecordStore`] and
//! [`file::FileRecordStore`]. The former is not durable across restarts. The latter writes its
//! state to disk after each change and loads it again on startup.
//!
//! Stores own per-key consistency. Every stored record carries a presence token (its `uid`)
//! and a resource version; an update that doesn't carry the current values of both is rejected
//! with [`StoreError::Conflict`] rather than silently overwriting a concurrent write.

use crate::config::StoreConfig;
use crate::error::{Error, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub mod file;
pub mod memory;

#[allow(clippy::module_name_repetitions)]
pub use file::FileRecordStore;
#[allow(clippy::module_name_repetitions)]
pub use memory::InMemoryRecordStore;

/// `DynRecordStore` is a shared handle to a [`RecordStore`]. Stores synchronize internally, so
/// the handle is used as a read-only capability by every concurrent caller.
#[allow(clippy::module_name_repetitions)]
pub type DynRecordStore = Arc<dyn RecordStore + Send + Sync>;

/// The only record type the solver writes.
pub const TXT: &str = "TXT";

/// Identity of a record within the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    pub namespace: String,
    pub name: String,
    /// Presence token. Empty exactly when the record hasn't been created in a store yet.
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub resource_version: u64,
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSpec {
    /// The DNS name the value is published under, without a trailing dot.
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: String,
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub metadata: RecordMeta,
    pub spec: RecordSpec,
}

impl DnsRecord {
    /// A record that hasn't been stored yet: identity and body set, no presence token.
    pub fn new(key: ObjectKey, labels: HashMap<String, String>, spec: RecordSpec) -> Self {
        Self {
            metadata: RecordMeta {
                namespace: key.namespace,
                name: key.name,
                labels,
                ..RecordMeta::default()
            },
            spec,
        }
    }

    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(&self.metadata.namespace, &self.metadata.name)
    }

    /// Whether the record has been assigned a presence token by a store.
    pub fn exists(&self) -> bool {
        !self.metadata.uid.is_empty()
    }
}

/// Outcome of [`RecordStore::get`]. Absence is an expected state, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(DnsRecord),
    NotFound,
}

/// An async trait describing a keyed, namespaced store of [`DnsRecord`]s.
#[async_trait::async_trait]
pub trait RecordStore {
    /// Fetch the record stored at `key`.
    async fn get(&self, key: &ObjectKey) -> Result<Lookup, StoreError>;

    /// Store a new record, assigning its presence token. Fails if the key is taken.
    async fn create(&self, record: DnsRecord) -> Result<DnsRecord, StoreError>;

    /// Replace an existing record. `record` must carry the stored presence token and resource
    /// version.
    async fn update(&self, record: DnsRecord) -> Result<DnsRecord, StoreError>;

    /// Remove the record stored at `key`.
    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError>;
}

/// Open the store described by `config`.
///
/// # Errors
///
/// Returns [`Error::Init`] if the backing state can't be loaded.
pub async fn connect(config: &StoreConfig) -> Result<DynRecordStore, Error> {
    match config {
        StoreConfig::Memory => Ok(Arc::new(InMemoryRecordStore::default())),
        StoreConfig::File { path } => {
            let store = FileRecordStore::try_from_file(path)
                .await
                .map_err(Error::Init)?;
            Ok(Arc::new(store))
        }
    }
}

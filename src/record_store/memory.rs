use crate::error::StoreError;
use crate::record_store::{DnsRecord, Lookup, ObjectKey, RecordStore};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

pub(super) type RecordMap = HashMap<ObjectKey, DnsRecord>;

#[derive(Default, Debug)]
pub struct InMemoryRecordStore {
    records: RwLock<RecordMap>,
}

impl InMemoryRecordStore {
    pub fn from_records(records: impl IntoIterator<Item = DnsRecord>) -> Self {
        let records = records.into_iter().map(|r| (r.key(), r)).collect();
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub(super) fn map(&self) -> &RwLock<RecordMap> {
        &self.records
    }
}

pub(super) fn sorted(records: &RecordMap) -> Vec<DnsRecord> {
    let mut records: Vec<DnsRecord> = records.values().cloned().collect();
    records.sort_by_key(DnsRecord::key);
    records
}

pub(super) fn create_in(
    records: &mut RecordMap,
    mut record: DnsRecord,
) -> Result<DnsRecord, StoreError> {
    let key = record.key();
    if records.contains_key(&key) {
        return Err(StoreError::AlreadyExists(key));
    }
    record.metadata.uid = Uuid::new_v4().to_string();
    record.metadata.resource_version = 1;
    records.insert(key, record.clone());
    Ok(record)
}

pub(super) fn update_in(
    records: &mut RecordMap,
    mut record: DnsRecord,
) -> Result<DnsRecord, StoreError> {
    let key = record.key();
    let Some(current) = records.get_mut(&key) else {
        return Err(StoreError::NotFound(key));
    };
    if current.metadata.uid != record.metadata.uid {
        return Err(StoreError::Conflict {
            key,
            expected: format!("uid {}", record.metadata.uid),
            actual: format!("uid {}", current.metadata.uid),
        });
    }
    if current.metadata.resource_version != record.metadata.resource_version {
        return Err(StoreError::Conflict {
            key,
            expected: format!("version {}", record.metadata.resource_version),
            actual: format!("version {}", current.metadata.resource_version),
        });
    }
    record.metadata.resource_version += 1;
    *current = record.clone();
    Ok(record)
}

pub(super) fn delete_in(records: &mut RecordMap, key: &ObjectKey) -> Result<(), StoreError> {
    match records.remove(key) {
        Some(_) => Ok(()),
        None => Err(StoreError::NotFound(key.clone())),
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get(&self, key: &ObjectKey) -> Result<Lookup, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .get(key)
            .map_or(Lookup::NotFound, |r| Lookup::Found(r.clone())))
    }

    async fn create(&self, record: DnsRecord) -> Result<DnsRecord, StoreError> {
        create_in(&mut *self.records.write().await, record)
    }

    async fn update(&self, record: DnsRecord) -> Result<DnsRecord, StoreError> {
        update_in(&mut *self.records.write().await, record)
    }

    async fn delete(&self, key: &ObjectKey) -> Result<(), StoreError> {
        delete_in(&mut *self.records.write().await, key)
    }
}

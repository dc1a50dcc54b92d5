use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::schema::{relations, ALL_COLLECTIONS};
use super::{Record, RecordStore, StoreError};
use crate::filter::{Filter, FilterData};

/// Fields the store owns; patches cannot overwrite them
const SYSTEM_FIELDS: &[&str] = &["id", "created_at", "updated_at"];

/// In-process record store keeping collections in insertion order
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let collections = ALL_COLLECTIONS
            .iter()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();

        Self {
            collections: RwLock::new(collections),
        }
    }

    /// Insert a record as-is (fixture loading). The record must carry an `id`.
    pub async fn insert(&self, collection: &str, record: Record) -> Result<(), StoreError> {
        let id = record_id(&record)
            .ok_or_else(|| StoreError::InvalidRecord(format!("{} record without id", collection)))?
            .to_string();

        let mut collections = self.collections.write().await;
        let records = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

        if records.iter().any(|r| record_id(r) == Some(id.as_str())) {
            return Err(StoreError::InvalidRecord(format!("duplicate id {} in {}", id, collection)));
        }
        records.push(record);
        Ok(())
    }

    pub async fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }

    fn expand(collections: &HashMap<String, Vec<Record>>, collection: &str, mut record: Record, depth: u8) -> Record {
        if depth == 0 {
            return record;
        }

        for relation in relations(collection) {
            if let Some(value) = record.get_mut(relation.field) {
                Self::expand_value(collections, relation.collection, value, depth);
            }
        }
        record
    }

    fn expand_value(collections: &HashMap<String, Vec<Record>>, target: &str, value: &mut Value, depth: u8) {
        match value {
            Value::Array(items) => {
                for item in items.iter_mut() {
                    Self::expand_value(collections, target, item, depth);
                }
            }
            Value::String(id) => {
                let found = collections
                    .get(target)
                    .and_then(|records| records.iter().find(|r| record_id(r) == Some(id.as_str())));

                // Dangling references stay as bare ids
                if let Some(found) = found {
                    *value = Value::Object(Self::expand(collections, target, found.clone(), depth - 1));
                }
            }
            _ => {}
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn record_id(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find(&self, collection: &str, filter_data: &FilterData, depth: u8) -> Result<Vec<Record>, StoreError> {
        let mut filter = Filter::new(collection)?;
        filter.assign(filter_data.clone())?;

        let collections = self.collections.read().await;
        let records = collections
            .get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

        let matched = filter.apply(records.iter().cloned());
        tracing::trace!("find {}: {} of {} records matched at depth {}", collection, matched.len(), records.len(), depth);

        Ok(matched
            .into_iter()
            .map(|record| filter.project(Self::expand(&collections, collection, record, depth)))
            .collect())
    }

    async fn create(&self, collection: &str, mut data: Record) -> Result<Record, StoreError> {
        let now = json!(Utc::now());
        data.insert("id".to_string(), json!(Uuid::new_v4().to_string()));
        data.insert("created_at".to_string(), now.clone());
        data.insert("updated_at".to_string(), now);

        self.insert(collection, data.clone()).await?;
        tracing::debug!("Created {} record {}", collection, data["id"]);
        Ok(data)
    }

    async fn update(&self, collection: &str, id: &str, patch: Record) -> Result<Record, StoreError> {
        let mut collections = self.collections.write().await;
        let record = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?
            .iter_mut()
            .find(|r| record_id(r) == Some(id))
            .ok_or_else(|| StoreError::NotFound { collection: collection.to_string(), id: id.to_string() })?;

        for (key, value) in patch {
            if !SYSTEM_FIELDS.contains(&key.as_str()) {
                record.insert(key, value);
            }
        }
        record.insert("updated_at".to_string(), json!(Utc::now()));

        tracing::debug!("Updated {} record {}", collection, id);
        Ok(record.clone())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<Record, StoreError> {
        let mut collections = self.collections.write().await;
        let records = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

        let position = records
            .iter()
            .position(|r| record_id(r) == Some(id))
            .ok_or_else(|| StoreError::NotFound { collection: collection.to_string(), id: id.to_string() })?;

        tracing::debug!("Deleted {} record {}", collection, id);
        Ok(records.remove(position))
    }
}

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::memory::MemoryStore;
use super::schema::{ORDERS, PRODUCTS, PRODUCT_FILES, USERS};
use super::StoreError;

/// Seed data for the in-memory store, one array per collection
#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub users: Vec<Value>,
    #[serde(default)]
    pub products: Vec<Value>,
    #[serde(default)]
    pub orders: Vec<Value>,
    #[serde(default)]
    pub product_files: Vec<Value>,
}

impl Fixture {
    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        serde_json::from_str(raw).map_err(|e| StoreError::Fixture(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Fixture(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    /// Build a store holding exactly the fixture's records
    pub async fn into_store(self) -> Result<MemoryStore, StoreError> {
        let store = MemoryStore::new();
        let sections = [
            (USERS, self.users),
            (PRODUCT_FILES, self.product_files),
            (PRODUCTS, self.products),
            (ORDERS, self.orders),
        ];

        for (collection, records) in sections {
            let count = records.len();
            for value in records {
                match value {
                    Value::Object(record) => store.insert(collection, record).await?,
                    other => {
                        return Err(StoreError::Fixture(format!("{} entries must be objects, got {}", collection, other)));
                    }
                }
            }
            tracing::info!("Loaded {} {} records from fixture", count, collection);
        }

        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_all_sections() {
        let fixture = Fixture::from_json(r#"{
            "users": [{ "id": "u1", "role": "customer" }],
            "product_files": [{ "id": "f1", "user": "u1" }],
            "products": [{ "id": "p1", "user": "u1", "product_files": "f1" }]
        }"#)
        .unwrap();

        let store = fixture.into_store().await.unwrap();
        assert_eq!(store.count(USERS).await, 1);
        assert_eq!(store.count(PRODUCTS).await, 1);
        assert_eq!(store.count(ORDERS).await, 0);
    }

    #[tokio::test]
    async fn rejects_non_object_entries() {
        let fixture = Fixture::from_json(r#"{ "orders": ["o1"] }"#).unwrap();
        assert!(matches!(fixture.into_store().await, Err(StoreError::Fixture(_))));
    }

    #[test]
    fn missing_file_is_a_fixture_error() {
        assert!(matches!(Fixture::from_file("/nonexistent/seed.json"), Err(StoreError::Fixture(_))));
    }
}

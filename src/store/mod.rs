// Record store interface consumed by the access layer and the file service

pub mod schema;
pub mod memory;
pub mod fixture;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::filter::{FilterData, FilterError};

pub use fixture::Fixture;
pub use memory::MemoryStore;
pub use schema::{Relation, ORDERS, PRODUCTS, PRODUCT_FILES, USERS};

/// Dynamic record as held by the store
pub type Record = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Record {id} not found in {collection}")]
    NotFound { collection: String, id: String },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Invalid filter: {0}")]
    Filter(#[from] FilterError),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Generic query interface over the persisted collections.
///
/// `depth` controls how many levels of relationship fields are replaced by
/// the records they reference; at depth 0 every relationship is a bare id.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find(&self, collection: &str, filter: &FilterData, depth: u8) -> Result<Vec<Record>, StoreError>;

    async fn find_by_id(&self, collection: &str, id: &str, depth: u8) -> Result<Option<Record>, StoreError> {
        let filter = FilterData {
            limit: Some(1),
            ..FilterData::field_equals("id", id)
        };
        Ok(self.find(collection, &filter, depth).await?.into_iter().next())
    }

    /// Persist a new record, assigning `id` and timestamps
    async fn create(&self, collection: &str, data: Record) -> Result<Record, StoreError>;

    /// Merge `patch` into an existing record
    async fn update(&self, collection: &str, id: &str, patch: Record) -> Result<Record, StoreError>;

    /// Remove a record and return it
    async fn delete(&self, collection: &str, id: &str) -> Result<Record, StoreError>;
}

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{AccessDecision, ResolutionError};
use crate::auth::Identity;
use crate::filter::FilterData;
use crate::models::{Order, Product, Ref};
use crate::store::{Record, RecordStore, ORDERS, PRODUCTS};

/// Depth at which order products carry their file references inline
pub const REQUIRED_ORDER_DEPTH: u8 = 2;

/// Computes which product files an identity may read: the files of products
/// it sells plus the files of products it bought.
#[derive(Clone)]
pub struct AccessResolver {
    store: Arc<dyn RecordStore>,
    order_depth: u8,
}

impl AccessResolver {
    pub fn new(store: Arc<dyn RecordStore>, order_depth: u8) -> Self {
        if order_depth < REQUIRED_ORDER_DEPTH {
            tracing::warn!(
                "Order depth {} is below {}; purchased files may be excluded from read access",
                order_depth, REQUIRED_ORDER_DEPTH
            );
        }
        Self { store, order_depth }
    }

    pub fn from_config(store: Arc<dyn RecordStore>) -> Self {
        Self::new(store, crate::config::config().access.order_depth)
    }

    pub fn order_depth(&self) -> u8 {
        self.order_depth
    }

    pub async fn resolve_read_access(&self, identity: Option<&Identity>) -> Result<AccessDecision, ResolutionError> {
        let Some(identity) = identity else {
            return Ok(AccessDecision::Deny);
        };

        if identity.is_admin() {
            return Ok(AccessDecision::AllowAll);
        }

        let (owned, purchased) = futures::try_join!(
            self.owned_file_ids(identity),
            self.purchased_file_ids(identity)
        )?;

        tracing::debug!(
            "Read access for {}: {} owned, {} purchased file ids",
            identity.id, owned.len(), purchased.len()
        );

        let mut file_ids = owned;
        file_ids.extend(purchased);
        Ok(AccessDecision::Restricted(file_ids))
    }

    /// Fail-closed variant: any resolution failure becomes a denial
    pub async fn resolve_or_deny(&self, identity: Option<&Identity>) -> AccessDecision {
        match self.resolve_read_access(identity).await {
            Ok(decision) => decision,
            Err(error) => {
                tracing::error!("Read access resolution failed, denying: {}", error);
                AccessDecision::Deny
            }
        }
    }

    async fn owned_file_ids(&self, identity: &Identity) -> Result<BTreeSet<String>, ResolutionError> {
        let filter = FilterData::field_equals("user", identity.id.as_str());
        let records = self
            .store
            .find(PRODUCTS, &filter, 0)
            .await
            .map_err(|source| ResolutionError::Store { collection: PRODUCTS, source })?;

        let products: Vec<Product> = decode(PRODUCTS, records);
        Ok(products
            .iter()
            .flat_map(Product::file_ids)
            .map(str::to_string)
            .collect())
    }

    async fn purchased_file_ids(&self, identity: &Identity) -> Result<BTreeSet<String>, ResolutionError> {
        let filter = FilterData::field_equals("user", identity.id.as_str());
        let records = self
            .store
            .find(ORDERS, &filter, self.order_depth)
            .await
            .map_err(|source| ResolutionError::Store { collection: ORDERS, source })?;

        let orders: Vec<Order> = decode(ORDERS, records);
        let mut file_ids = BTreeSet::new();

        for order in &orders {
            for product in order.product_refs() {
                match product {
                    Ok(Ref::Resolved(product)) => file_ids.extend(product.file_ids().map(str::to_string)),
                    Ok(Ref::Id(product_id)) => {
                        // Under-grant: the product's files stay unreadable
                        tracing::error!(
                            "Search depth not sufficient to find purchased file IDs (order {}, product {}, depth {})",
                            order.id, product_id, self.order_depth
                        );
                    }
                    Err(e) => {
                        tracing::warn!("Skipping malformed product in order {}: {}", order.id, e);
                    }
                }
            }
        }

        Ok(file_ids)
    }
}

/// Decode records one by one; a record that does not fit the view is logged
/// and left out instead of failing the whole decision
fn decode<T: DeserializeOwned>(collection: &str, records: Vec<Record>) -> Vec<T> {
    records
        .into_iter()
        .filter_map(|record| {
            let id = record.get("id").cloned().unwrap_or(Value::Null);
            match serde_json::from_value(Value::Object(record)) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    tracing::warn!("Skipping malformed {} record {}: {}", collection, id, e);
                    None
                }
            }
        })
        .collect()
}

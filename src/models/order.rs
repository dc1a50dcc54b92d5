use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::reference::{one_or_many, Ref};
use super::Product;

/// Order as seen by access checks. Products stay raw until read so one
/// malformed entry cannot hide the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub products: Vec<Value>,
}

impl Order {
    /// Each purchased product, decoded on its own
    pub fn product_refs(&self) -> impl Iterator<Item = Result<Ref<Product>, serde_json::Error>> + '_ {
        self.products.iter().map(|value| Ref::<Product>::deserialize(value))
    }
}

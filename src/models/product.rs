use serde::{Deserialize, Serialize};

use super::reference::{one_or_many, RecordRef, Ref};

/// Product as seen by access checks: its id and the files it carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub product_files: Vec<Ref<RecordRef>>,
}

impl Product {
    pub fn file_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.product_files.iter().map(Ref::id)
    }
}

use serde::{Deserialize, Deserializer, Serialize};

/// Relationship field that is either a bare id or an expanded record,
/// depending on the depth the record was loaded at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Id(String),
    Resolved(T),
}

/// Records addressable by a string id
pub trait Identified {
    fn id(&self) -> &str;
}

impl<T: Identified> Ref<T> {
    /// Normalize to the referenced id regardless of expansion
    pub fn id(&self) -> &str {
        match self {
            Ref::Id(id) => id,
            Ref::Resolved(record) => record.id(),
        }
    }

    pub fn resolved(&self) -> Option<&T> {
        match self {
            Ref::Id(_) => None,
            Ref::Resolved(record) => Some(record),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Accepts `null`, a single value or an array for a has-many field
pub fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
    })
}

/// Expanded record of which only the id is read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordRef {
    pub id: String,
}

impl Identified for RecordRef {
    fn id(&self) -> &str { &self.id }
}

impl Identified for super::Product {
    fn id(&self) -> &str { &self.id }
}

impl Identified for super::Order {
    fn id(&self) -> &str { &self.id }
}

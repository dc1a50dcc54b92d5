// Authorization for the product_files collection

pub mod resolver;
pub mod rules;

use std::collections::BTreeSet;

use serde_json::{json, Value};
use thiserror::Error;

use crate::store::StoreError;

pub use resolver::AccessResolver;
pub use rules::{can_create, can_delete, can_update, is_hidden_from, stamp_owner};

/// Outcome of a read-access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Every record is readable
    AllowAll,
    /// Only records whose id is in the set are readable
    Restricted(BTreeSet<String>),
    Deny,
}

impl AccessDecision {
    pub fn restricted<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AccessDecision::Restricted(ids.into_iter().map(Into::into).collect())
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, AccessDecision::Deny)
    }

    /// Whether a single record id is readable under this decision
    pub fn permits(&self, id: &str) -> bool {
        match self {
            AccessDecision::AllowAll => true,
            AccessDecision::Restricted(ids) => ids.contains(id),
            AccessDecision::Deny => false,
        }
    }

    /// Where-clause the store must apply, `None` when unrestricted.
    /// A denial maps to an empty id set so it can never match.
    pub fn to_filter(&self) -> Option<Value> {
        match self {
            AccessDecision::AllowAll => None,
            AccessDecision::Restricted(ids) => Some(json!({ "id": { "$in": ids } })),
            AccessDecision::Deny => Some(json!({ "id": { "$in": [] } })),
        }
    }
}

/// Failure to compute a read decision. Callers must treat it as a denial.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Failed to query {collection}: {source}")]
    Store {
        collection: &'static str,
        source: StoreError,
    },
}

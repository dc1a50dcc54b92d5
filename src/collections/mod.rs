// Collection definitions: the extension points a host calls around record
// lifecycle events, plus static collection settings

pub mod mime;
pub mod product_files;

use async_trait::async_trait;
use serde::Serialize;

use crate::access::{AccessDecision, ResolutionError};
use crate::auth::Identity;
use crate::store::Record;
use crate::types::Operation;

pub use mime::MimePolicy;
pub use product_files::ProductFiles;

/// Access rules and hooks of a collection, invoked synchronously by the host
#[async_trait]
pub trait CollectionAccess: Send + Sync {
    fn slug(&self) -> &'static str;

    /// Before a read query executes
    async fn read(&self, identity: Option<&Identity>) -> Result<AccessDecision, ResolutionError>;

    fn create(&self, identity: Option<&Identity>) -> bool;

    fn update(&self, identity: Option<&Identity>) -> bool;

    fn delete(&self, identity: Option<&Identity>) -> bool;

    /// Before a create or update is persisted
    fn before_change(&self, data: Record, identity: Option<&Identity>, operation: Operation) -> Record;

    /// Whether the admin UI hides this collection from the identity
    fn hidden(&self, _identity: Option<&Identity>) -> bool {
        false
    }
}

/// Public description of a collection for admin tooling
#[derive(Debug, Clone, Serialize)]
pub struct CollectionDescription {
    pub slug: &'static str,
    pub hidden: bool,
    pub upload: Option<UploadDescription>,
    pub access: AccessSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadDescription {
    pub static_url: String,
    pub static_dir: String,
    pub mime_types: Vec<String>,
}

/// What the requesting identity may do
#[derive(Debug, Clone, Serialize)]
pub struct AccessSummary {
    pub read: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

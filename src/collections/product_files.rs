use std::sync::Arc;

use async_trait::async_trait;

use super::{AccessSummary, CollectionAccess, CollectionDescription, MimePolicy, UploadDescription};
use crate::access::{self, AccessDecision, AccessResolver, ResolutionError};
use crate::auth::Identity;
use crate::config::UploadConfig;
use crate::store::{Record, RecordStore, PRODUCT_FILES};
use crate::types::Operation;

/// Uploaded files attached to products. Readable by their seller and by
/// buyers of the product; only admins may change or remove them.
#[derive(Clone)]
pub struct ProductFiles {
    resolver: AccessResolver,
    upload: UploadConfig,
    mime_policy: MimePolicy,
}

impl ProductFiles {
    pub fn new(resolver: AccessResolver, upload: UploadConfig) -> Self {
        Self {
            resolver,
            upload,
            mime_policy: MimePolicy::product_files(),
        }
    }

    pub fn from_config(store: Arc<dyn RecordStore>) -> Self {
        Self::new(
            AccessResolver::from_config(store),
            crate::config::config().upload.clone(),
        )
    }

    pub fn with_mime_policy(mut self, mime_policy: MimePolicy) -> Self {
        self.mime_policy = mime_policy;
        self
    }

    pub fn resolver(&self) -> &AccessResolver {
        &self.resolver
    }

    pub fn mime_policy(&self) -> &MimePolicy {
        &self.mime_policy
    }

    /// Public URL a stored file is served from
    pub fn file_url(&self, filename: &str) -> String {
        format!("{}/{}", self.upload.static_url.trim_end_matches('/'), urlencoding::encode(filename))
    }

    pub async fn describe(&self, identity: Option<&Identity>) -> CollectionDescription {
        let read = !self.resolver.resolve_or_deny(identity).await.is_denied();

        CollectionDescription {
            slug: self.slug(),
            hidden: self.hidden(identity),
            upload: Some(UploadDescription {
                static_url: self.upload.static_url.clone(),
                static_dir: self.upload.static_dir.clone(),
                mime_types: self.mime_policy.allowed().to_vec(),
            }),
            access: AccessSummary {
                read,
                create: self.create(identity),
                update: self.update(identity),
                delete: self.delete(identity),
            },
        }
    }
}

#[async_trait]
impl CollectionAccess for ProductFiles {
    fn slug(&self) -> &'static str {
        PRODUCT_FILES
    }

    async fn read(&self, identity: Option<&Identity>) -> Result<AccessDecision, ResolutionError> {
        self.resolver.resolve_read_access(identity).await
    }

    fn create(&self, identity: Option<&Identity>) -> bool {
        access::can_create(identity)
    }

    fn update(&self, identity: Option<&Identity>) -> bool {
        access::can_update(identity)
    }

    fn delete(&self, identity: Option<&Identity>) -> bool {
        access::can_delete(identity)
    }

    fn before_change(&self, mut data: Record, identity: Option<&Identity>, operation: Operation) -> Record {
        match operation {
            Operation::Create => access::stamp_owner(data, identity),
            // Owner is fixed at creation
            Operation::Update => {
                data.remove(access::rules::OWNER_FIELD);
                data.remove("id");
                data
            }
        }
    }

    fn hidden(&self, identity: Option<&Identity>) -> bool {
        access::is_hidden_from(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn collection() -> ProductFiles {
        ProductFiles::new(
            AccessResolver::new(Arc::new(MemoryStore::new()), 2),
            UploadConfig::default(),
        )
    }

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn create_stamps_owner() {
        let data = collection().before_change(
            record(json!({ "filename": "a.zip", "user": "spoof" })),
            Some(&Identity::customer("u1")),
            Operation::Create,
        );
        assert_eq!(data["user"], json!("u1"));
    }

    #[test]
    fn update_cannot_reassign_owner() {
        let data = collection().before_change(
            record(json!({ "filename": "b.zip", "user": "a1", "id": "other" })),
            Some(&Identity::admin("a1")),
            Operation::Update,
        );
        assert!(!data.contains_key("user"));
        assert!(!data.contains_key("id"));
        assert_eq!(data["filename"], json!("b.zip"));
    }

    #[test]
    fn file_url_joins_static_url() {
        assert_eq!(collection().file_url("a.zip"), "/product_files/a.zip");
        assert_eq!(collection().file_url("my guide?.pdf"), "/product_files/my%20guide%3F.pdf");
    }

    #[tokio::test]
    async fn describe_reflects_identity() {
        let products = collection();

        let admin = products.describe(Some(&Identity::admin("a1"))).await;
        assert!(!admin.hidden);
        assert!(admin.access.update && admin.access.delete && admin.access.read);

        let anonymous = products.describe(None).await;
        assert!(anonymous.hidden);
        assert!(!anonymous.access.read && !anonymous.access.create);

        let customer = products.describe(Some(&Identity::customer("u1"))).await;
        assert!(customer.access.read && customer.access.create);
        assert!(!customer.access.update);
    }
}

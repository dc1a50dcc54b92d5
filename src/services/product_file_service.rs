use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::access::{AccessDecision, ResolutionError};
use crate::auth::Identity;
use crate::collections::{CollectionAccess, CollectionDescription, ProductFiles};
use crate::filter::{FilterData, FilterError};
use crate::store::{Record, RecordStore, StoreError, PRODUCT_FILES};
use crate::types::Operation;

#[derive(Debug, thiserror::Error)]
pub enum FileServiceError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },
    #[error("Access resolution failed: {0}")]
    Resolution(#[from] ResolutionError),
    #[error("Invalid filter: {0}")]
    Filter(#[from] FilterError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl FileServiceError {
    fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.into());
        FileServiceError::Validation {
            message: "Invalid product file".to_string(),
            field_errors,
        }
    }
}

/// Host-side operations on product file records with the collection's
/// access rules applied
#[derive(Clone)]
pub struct ProductFileService {
    store: Arc<dyn RecordStore>,
    collection: ProductFiles,
}

impl ProductFileService {
    pub fn new(store: Arc<dyn RecordStore>, collection: ProductFiles) -> Self {
        Self { store, collection }
    }

    pub fn from_config(store: Arc<dyn RecordStore>) -> Self {
        let collection = ProductFiles::from_config(store.clone());
        Self::new(store, collection)
    }

    pub fn collection(&self) -> &ProductFiles {
        &self.collection
    }

    async fn read_decision(&self, identity: Option<&Identity>) -> Result<AccessDecision, FileServiceError> {
        let decision = self.collection.read(identity).await?;
        if decision.is_denied() {
            return Err(FileServiceError::Forbidden("You are not allowed to read product files".to_string()));
        }
        Ok(decision)
    }

    /// Files readable by the identity, narrowed by the caller's filter
    pub async fn list(&self, identity: Option<&Identity>, filter: FilterData) -> Result<Vec<Record>, FileServiceError> {
        let decision = self.read_decision(identity).await?;
        let filter = match decision.to_filter() {
            Some(restriction) => filter.and_where(restriction),
            None => filter,
        };

        let records = self.store.find(PRODUCT_FILES, &filter, 0).await?;
        tracing::info!("Listed {} product files", records.len());
        Ok(records)
    }

    /// Unreadable files are reported as missing so their existence does not leak
    pub async fn get(&self, identity: Option<&Identity>, id: &str) -> Result<Record, FileServiceError> {
        let decision = self.read_decision(identity).await?;
        if !decision.permits(id) {
            return Err(Self::not_found(id));
        }

        self.store
            .find_by_id(PRODUCT_FILES, id, 0)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    pub async fn create(&self, identity: Option<&Identity>, data: Record) -> Result<Record, FileServiceError> {
        if !self.collection.create(identity) {
            return Err(FileServiceError::Unauthorized("Authentication required to upload product files".to_string()));
        }

        let filename = Self::require_filename(&data)?;
        self.validate_mime_type(data.get("mime_type"), true)?;
        Self::validate_filesize(data.get("filesize"))?;

        let mut data = self.collection.before_change(data, identity, Operation::Create);
        data.insert("url".to_string(), json!(self.collection.file_url(&filename)));

        if !data.get(crate::access::rules::OWNER_FIELD).map_or(false, Value::is_string) {
            return Err(FileServiceError::invalid_field("user", "This field is required"));
        }

        let created = self.store.create(PRODUCT_FILES, data).await?;
        tracing::info!("Created product file {} ({})", created["id"], filename);
        Ok(created)
    }

    pub async fn update(&self, identity: Option<&Identity>, id: &str, patch: Record) -> Result<Record, FileServiceError> {
        if !self.collection.update(identity) {
            return Err(FileServiceError::Forbidden("Only admins may update product files".to_string()));
        }

        if self.store.find_by_id(PRODUCT_FILES, id, 0).await?.is_none() {
            return Err(Self::not_found(id));
        }

        let mut patch = self.collection.before_change(patch, identity, Operation::Update);
        self.validate_mime_type(patch.get("mime_type"), false)?;
        Self::validate_filesize(patch.get("filesize"))?;
        if patch.contains_key("filename") {
            let filename = Self::require_filename(&patch)?;
            patch.insert("url".to_string(), json!(self.collection.file_url(&filename)));
        }

        let updated = self.store.update(PRODUCT_FILES, id, patch).await?;
        tracing::info!("Updated product file {}", id);
        Ok(updated)
    }

    pub async fn delete(&self, identity: Option<&Identity>, id: &str) -> Result<Record, FileServiceError> {
        if !self.collection.delete(identity) {
            return Err(FileServiceError::Forbidden("Only admins may delete product files".to_string()));
        }

        let deleted = self.store.delete(PRODUCT_FILES, id).await.map_err(|e| match e {
            StoreError::NotFound { .. } => Self::not_found(id),
            other => other.into(),
        })?;
        tracing::info!("Deleted product file {}", id);
        Ok(deleted)
    }

    pub async fn describe(&self, identity: Option<&Identity>) -> CollectionDescription {
        self.collection.describe(identity).await
    }

    fn not_found(id: &str) -> FileServiceError {
        FileServiceError::NotFound(format!("Product file {} not found", id))
    }

    fn require_string(data: &Record, field: &str) -> Result<String, FileServiceError> {
        match data.get(field).and_then(Value::as_str).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value.to_string()),
            _ => Err(FileServiceError::invalid_field(field, "This field is required")),
        }
    }

    /// A bare file name: no directory parts, no control characters
    fn require_filename(data: &Record) -> Result<String, FileServiceError> {
        let filename = Self::require_string(data, "filename")?;
        let is_path = filename.contains(['/', '\\'])
            || filename == "."
            || filename == ".."
            || filename.chars().any(char::is_control);
        if is_path {
            return Err(FileServiceError::invalid_field("filename", "Must be a file name without path separators"));
        }
        Ok(filename)
    }

    fn validate_mime_type(&self, value: Option<&Value>, required: bool) -> Result<(), FileServiceError> {
        match value {
            None if !required => Ok(()),
            Some(Value::String(mime_type)) => {
                if self.collection.mime_policy().accepts(mime_type) {
                    Ok(())
                } else {
                    Err(FileServiceError::invalid_field("mime_type", format!("File type {} is not allowed", mime_type)))
                }
            }
            _ => Err(FileServiceError::invalid_field("mime_type", "This field is required")),
        }
    }

    fn validate_filesize(value: Option<&Value>) -> Result<(), FileServiceError> {
        match value {
            None | Some(Value::Null) => Ok(()),
            Some(v) if v.as_u64().is_some() => Ok(()),
            Some(_) => Err(FileServiceError::invalid_field("filesize", "Must be a non-negative integer")),
        }
    }
}

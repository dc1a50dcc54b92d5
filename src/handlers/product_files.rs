use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::app::AppState;
use crate::collections::CollectionDescription;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::middleware::{ApiResponse, ApiResult, RequestIdentity};
use crate::store::Record;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// Sort order, e.g. `filename asc` or `-created_at`
    pub order: Option<String>,
    /// JSON-encoded where clause
    #[serde(rename = "where")]
    pub where_clause: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> Result<FilterData, ApiError> {
        let where_clause = self
            .where_clause
            .map(|raw| serde_json::from_str::<Value>(&raw))
            .transpose()
            .map_err(|e| ApiError::bad_request(format!("Invalid where parameter: {}", e)))?;

        Ok(FilterData {
            where_clause,
            order: self.order.map(Value::String),
            limit: self.limit,
            offset: self.offset,
            ..Default::default()
        })
    }
}

fn into_record(body: Value) -> Result<Record, ApiError> {
    match body {
        Value::Object(record) => Ok(record),
        _ => Err(ApiError::bad_request("Request body must be a JSON object")),
    }
}

/// GET /api/product_files - Files readable by the caller
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Record>> {
    let filter = query.into_filter()?;
    let records = state.service.list(identity.identity(), filter).await?;
    Ok(ApiResponse::success(records))
}

/// POST /api/find/product_files - Filtered search within the caller's readable files
pub async fn find(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Json(filter): Json<FilterData>,
) -> ApiResult<Vec<Record>> {
    let records = state.service.list(identity.identity(), filter).await?;
    Ok(ApiResponse::success(records))
}

/// GET /api/product_files/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
) -> ApiResult<Record> {
    let record = state.service.get(identity.identity(), &id).await?;
    Ok(ApiResponse::success(record))
}

/// POST /api/product_files - Register an uploaded file; the caller becomes its owner
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Json(body): Json<Value>,
) -> ApiResult<Record> {
    let record = state.service.create(identity.identity(), into_record(body)?).await?;
    Ok(ApiResponse::created(record))
}

/// PATCH /api/product_files/:id - Admin only
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Record> {
    let record = state.service.update(identity.identity(), &id, into_record(body)?).await?;
    Ok(ApiResponse::success(record))
}

/// DELETE /api/product_files/:id - Admin only
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
) -> ApiResult<Record> {
    let record = state.service.delete(identity.identity(), &id).await?;
    Ok(ApiResponse::success(record))
}

/// GET /api/meta/product_files - Collection description as seen by the caller
pub async fn describe(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
) -> ApiResult<CollectionDescription> {
    Ok(ApiResponse::success(state.service.describe(identity.identity()).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_query_parses_where_json() {
        let query = ListQuery {
            limit: Some(5),
            where_clause: Some(r#"{"mime_type":"application/pdf"}"#.to_string()),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(filter.where_clause, Some(json!({ "mime_type": "application/pdf" })));
        assert_eq!(filter.limit, Some(5));
    }

    #[test]
    fn list_query_rejects_malformed_where() {
        let query = ListQuery {
            where_clause: Some("{not json".to_string()),
            ..Default::default()
        };
        assert_eq!(query.into_filter().unwrap_err().status_code(), 400);
    }

    #[test]
    fn body_must_be_an_object() {
        assert!(into_record(json!(["a"])).is_err());
        assert!(into_record(json!({ "filename": "a.pdf" })).is_ok());
    }
}

use axum::extract::Extension;
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult, RequestIdentity};

/// GET /api/auth/whoami - Identity carried by the bearer token, `null` when anonymous
///
/// ```json
/// { "success": true, "data": { "id": "u1", "role": "customer", "is_admin": false } }
/// ```
pub async fn whoami(Extension(identity): Extension<RequestIdentity>) -> ApiResult<Value> {
    let data = match identity.identity() {
        Some(identity) => json!({
            "id": identity.id,
            "role": identity.role,
            "is_admin": identity.is_admin(),
        }),
        None => Value::Null,
    };

    Ok(ApiResponse::success(data))
}

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::auth::{validate_jwt, Identity};
use crate::error::ApiError;

/// Identity attached to every request; `None` for anonymous callers
#[derive(Clone, Debug, Default)]
pub struct RequestIdentity(pub Option<Identity>);

impl RequestIdentity {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

/// Resolves the bearer token into an identity. A missing Authorization
/// header means anonymous; a malformed or invalid token is rejected.
pub async fn identity_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = match extract_jwt_from_headers(&headers) {
        Ok(None) => None,
        Ok(Some(token)) => match validate_jwt(&token, &state.jwt_secret) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::debug!("Rejected bearer token: {}", e);
                return ApiError::unauthorized(e.to_string()).into_response();
            }
        },
        Err(msg) => return ApiError::unauthorized(msg).into_response(),
    };

    if let Some(identity) = &identity {
        tracing::debug!("Request identity {} ({:?})", identity.id, identity.role);
    }

    request.extensions_mut().insert(RequestIdentity(identity));
    next.run(request).await
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<Option<String>, String> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if token.trim().is_empty() => Err("Empty JWT token".to_string()),
        Some(token) => Ok(Some(token.trim().to_string())),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use product_files::access::AccessResolver;
use product_files::app::{app, AppState};
use product_files::auth::{generate_jwt, Claims, Identity};
use product_files::collections::ProductFiles;
use product_files::config::UploadConfig;
use product_files::services::ProductFileService;
use product_files::store::{Fixture, MemoryStore, RecordStore};

pub const SECRET: &str = "integration-test-secret";

/// Marketplace with one seller, one buyer of p2, and a second seller
pub const SEED: &str = r#"{
    "users": [
        { "id": "admin", "role": "admin" },
        { "id": "seller", "role": "customer" },
        { "id": "other", "role": "customer" },
        { "id": "buyer", "role": "customer" },
        { "id": "stranger", "role": "customer" }
    ],
    "product_files": [
        { "id": "f1", "user": "seller", "filename": "guide.pdf", "mime_type": "application/pdf", "filesize": 1024 },
        { "id": "f2", "user": "seller", "filename": "assets.zip", "mime_type": "application/zip", "filesize": 4096 },
        { "id": "f3", "user": "other", "filename": "track.mp3", "mime_type": "audio/mpeg", "filesize": 2048 }
    ],
    "products": [
        { "id": "p1", "user": "seller", "name": "Guide", "product_files": ["f1"] },
        { "id": "p2", "user": "seller", "name": "Asset pack", "product_files": "f2" },
        { "id": "p3", "user": "other", "name": "Track", "product_files": ["f3"] }
    ],
    "orders": [
        { "id": "o1", "user": "buyer", "products": ["p2"] }
    ]
}"#;

pub async fn seeded_store() -> Result<Arc<MemoryStore>> {
    let store = Fixture::from_json(SEED)?.into_store().await?;
    Ok(Arc::new(store))
}

pub fn router_for(store: Arc<dyn RecordStore>, order_depth: u8) -> Router {
    let collection = ProductFiles::new(AccessResolver::new(store.clone(), order_depth), UploadConfig::default());
    let service = ProductFileService::new(store, collection);
    app(AppState::new(service, SECRET))
}

pub async fn test_app() -> Result<Router> {
    Ok(router_for(seeded_store().await?, 2))
}

pub fn token_for(identity: &Identity) -> Result<String> {
    generate_jwt(&Claims::new(identity, 1), SECRET).context("failed to sign test token")
}

/// Send one request through the router and decode the JSON body (Null when empty)
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).context("response body is not JSON")?
    };

    Ok((status, json))
}

pub async fn get_as(app: &Router, uri: &str, identity: Option<&Identity>) -> Result<(StatusCode, Value)> {
    let token = identity.map(token_for).transpose()?;
    send(app, Method::GET, uri, token.as_deref(), None).await
}

/// Ids of the records in a `{ "success": true, "data": [...] }` envelope
pub fn data_ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .map(|records| {
            records
                .iter()
                .filter_map(|r| r["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

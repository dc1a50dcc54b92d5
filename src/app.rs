use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::handlers;
use crate::middleware::identity_middleware;
use crate::services::ProductFileService;
use crate::store::RecordStore;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: ProductFileService,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(service: ProductFileService, jwt_secret: impl Into<Arc<str>>) -> Self {
        Self {
            service,
            jwt_secret: jwt_secret.into(),
        }
    }

    pub fn from_config(store: Arc<dyn RecordStore>, config: &AppConfig) -> Self {
        Self::new(
            ProductFileService::from_config(store),
            config.security.jwt_secret.as_str(),
        )
    }
}

/// Build the HTTP router. Layers that depend on config are applied by the caller
/// through `with_global_layers`.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/health", get(handlers::health::health))
        .merge(api_routes())
        .layer(from_fn_with_state(state.clone(), identity_middleware))
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    use handlers::{auth, product_files};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route(
            "/api/product_files",
            get(product_files::list).post(product_files::create),
        )
        .route(
            "/api/product_files/:id",
            get(product_files::get)
                .patch(product_files::update)
                .delete(product_files::delete),
        )
        .route("/api/find/product_files", post(product_files::find))
        .route("/api/meta/product_files", get(product_files::describe))
}

/// Apply CORS and request tracing as configured
pub fn with_global_layers(router: Router, config: &AppConfig) -> Router {
    let router = if config.security.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

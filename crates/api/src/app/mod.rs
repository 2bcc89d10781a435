//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store adapters and use cases built from configuration
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use catalog_infra::config::CatalogConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Upper bound for a multipart image upload.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &CatalogConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(config).await?);
    Ok(router(services))
}

/// Router over already-built services.
pub fn router(services: Arc<services::AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
                .layer(Extension(services)),
        )
}

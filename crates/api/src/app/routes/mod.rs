use axum::Router;

pub mod files;
pub mod images;
pub mod products;
pub mod system;

/// Router for the catalog endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router().merge(images::router()))
        .nest("/uploads", files::router())
}

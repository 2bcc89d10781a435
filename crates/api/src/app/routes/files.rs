use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    response::IntoResponse,
    routing::get,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// Served under the path of `API_UPLOAD_URL`, so derived image URLs resolve.
pub fn router() -> Router {
    Router::new().route("/:file_name", get(find_file))
}

pub async fn find_file(
    Extension(services): Extension<Arc<AppServices>>,
    Path(file_name): Path<String>,
) -> axum::response::Response {
    match services.find_file.execute(&file_name).await {
        Ok(file_url) => Json(dto::FileUrlResponse { file_url }).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

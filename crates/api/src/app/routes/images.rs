use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Multipart, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};

use catalog_infra::use_cases::UploadProductImageInput;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

pub fn router() -> Router {
    Router::new()
        .route("/:id/images", get(list_images).post(upload_image))
        .route("/:id/images/:file_name", delete(delete_image))
}

pub async fn list_images(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let product_id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.find_images.execute(product_id).await {
        Ok(images) => Json(images.iter().map(dto::ImageResponse::from).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn upload_image(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> axum::response::Response {
    let product_id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    let (file_name, content) = loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "missing_file",
                    format!("multipart field '{FILE_FIELD}' is required"),
                );
            }
            Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_multipart", e.body_text()),
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        match field.bytes().await {
            Ok(bytes) => break (file_name, bytes.to_vec()),
            Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_multipart", e.body_text()),
        }
    };

    let input = UploadProductImageInput {
        product_id,
        file_name,
        content,
    };

    match services.upload_image.execute(input).await {
        Ok(image) => (
            StatusCode::CREATED,
            Json(dto::UploadImageResponse {
                file_name: image.file_name().to_string(),
                url: image.url().to_string(),
            }),
        )
            .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn delete_image(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, file_name)): Path<(String, String)>,
) -> axum::response::Response {
    let product_id = match errors::parse_product_id(&id) {
        Ok(v) => v,
        Err(res) => return res,
    };

    match services.delete_image.execute(product_id, &file_name).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use catalog_core::ProductId;
use catalog_infra::CatalogError;

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        CatalogError::ProductNotFound => json_error(StatusCode::NOT_FOUND, "product_not_found", message),
        CatalogError::ProductImagesNotFound => {
            json_error(StatusCode::NOT_FOUND, "product_images_not_found", message)
        }
        CatalogError::ImageNotFound => json_error(StatusCode::NOT_FOUND, "image_not_found", message),
        CatalogError::ProductImageCannotBeEmpty => {
            json_error(StatusCode::CONFLICT, "product_image_cannot_be_empty", message)
        }
        CatalogError::InvalidImageData(_) => json_error(StatusCode::BAD_REQUEST, "invalid_image_data", message),
        CatalogError::InvalidProductImage(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_product_image", message)
        }
        CatalogError::InvalidProductData(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_product_data", message)
        }
        CatalogError::DeleteImagesStorage(_) => {
            json_error(StatusCode::BAD_GATEWAY, "delete_images_storage_error", message)
        }
        CatalogError::BucketDelete(_) => json_error(StatusCode::BAD_GATEWAY, "bucket_delete_error", message),
        CatalogError::BucketNotFound => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "bucket_not_found", message)
        }
        CatalogError::Storage(_) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message),
        CatalogError::Metadata(_) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "metadata_error", message),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_product_id(s: &str) -> Result<ProductId, axum::response::Response> {
    s.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"))
}

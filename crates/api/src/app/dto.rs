use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use catalog_products::{Image, Product};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub category_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub id: String,
    pub file_name: String,
    pub url: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Image> for ImageResponse {
    fn from(img: &Image) -> Self {
        Self {
            id: img.id_typed().to_string(),
            file_name: img.file_name().to_string(),
            url: img.url().to_string(),
            is_default: img.is_default(),
            created_at: img.created_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub active: bool,
    pub default_image_url: Option<String>,
    pub images: Vec<ImageResponse>,
}

impl From<&Product> for ProductResponse {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id_typed().to_string(),
            category_id: p.category_id().to_string(),
            name: p.name().to_string(),
            description: p.description().to_string(),
            price: p.price().value(),
            active: p.is_active(),
            default_image_url: p.default_image().map(|img| img.url().to_string()),
            images: p.images().iter().map(ImageResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    pub file_name: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct FileUrlResponse {
    pub file_url: String,
}

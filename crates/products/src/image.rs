//! Product image entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, Entity, ImageId};

use crate::error::ProductError;
use crate::naming::generate_file_name;

/// Storage key of the shared stock image attached to every new product.
///
/// The blob behind this key is reused across products and must never be
/// deleted from storage.
pub const PLACEHOLDER_IMAGE_FILE_NAME: &str = "default_product_image.webp";

/// Derives public image URLs from a configured base (e.g. `https://cdn.example/uploads`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrls {
    base: String,
}

impl ImageUrls {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.base, file_name)
    }
}

/// A single photo of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    id: ImageId,
    file_name: String,
    url: String,
    is_default: bool,
    created_at: DateTime<Utc>,
}

impl Image {
    /// The stock image, marked default.
    pub fn placeholder(urls: &ImageUrls) -> Self {
        Self {
            id: ImageId::new(),
            file_name: PLACEHOLDER_IMAGE_FILE_NAME.to_string(),
            url: urls.url_for(PLACEHOLDER_IMAGE_FILE_NAME),
            is_default: true,
            created_at: Utc::now(),
        }
    }

    /// A freshly uploaded image: named by the naming policy, marked default.
    pub fn uploaded(original_file_name: &str, urls: &ImageUrls) -> Result<Self, ProductError> {
        let file_name = generate_file_name(original_file_name)?;
        Ok(Self {
            id: ImageId::new(),
            url: urls.url_for(&file_name),
            file_name,
            is_default: true,
            created_at: Utc::now(),
        })
    }

    /// Rebuild an image from persisted fields.
    pub fn restore(
        id: ImageId,
        file_name: impl Into<String>,
        url: impl Into<String>,
        is_default: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ProductError> {
        let file_name = file_name.into();
        let url = url.into();
        if file_name.is_empty() || url.is_empty() {
            return Err(DomainError::validation("image file name and URL are required").into());
        }

        Ok(Self {
            id,
            file_name,
            url,
            is_default,
            created_at,
        })
    }

    pub fn id_typed(&self) -> ImageId {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_placeholder(&self) -> bool {
        self.file_name == PLACEHOLDER_IMAGE_FILE_NAME
    }

    pub(crate) fn set_default(&mut self, is_default: bool) {
        self.is_default = is_default;
    }

    pub(crate) fn set_url(&mut self, url: String) {
        self.url = url;
    }
}

impl Entity for Image {
    type Id = ImageId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> ImageUrls {
        ImageUrls::new("http://localhost:8080/uploads/")
    }

    #[test]
    fn url_base_drops_trailing_slash() {
        assert_eq!(urls().url_for("a.png"), "http://localhost:8080/uploads/a.png");
    }

    #[test]
    fn placeholder_is_default_and_recognised() {
        let img = Image::placeholder(&urls());
        assert!(img.is_default());
        assert!(img.is_placeholder());
        assert_eq!(img.file_name(), PLACEHOLDER_IMAGE_FILE_NAME);
        assert!(img.url().ends_with(PLACEHOLDER_IMAGE_FILE_NAME));
    }

    #[test]
    fn uploaded_image_gets_generated_name_and_derived_url() {
        let img = Image::uploaded("my photo.jpg", &urls()).unwrap();
        assert!(img.file_name().starts_with("myphoto_"));
        assert_eq!(img.url(), urls().url_for(img.file_name()));
        assert!(img.is_default());
        assert!(!img.is_placeholder());
    }

    #[test]
    fn restore_requires_file_name_and_url() {
        let err = Image::restore(ImageId::new(), "", "http://x/a", false, Utc::now()).unwrap_err();
        assert!(matches!(err, ProductError::Domain(DomainError::Validation(_))));

        let err = Image::restore(ImageId::new(), "a.png", "", false, Utc::now()).unwrap_err();
        assert!(matches!(err, ProductError::Domain(DomainError::Validation(_))));
    }
}

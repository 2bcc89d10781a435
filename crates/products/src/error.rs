use thiserror::Error;

use catalog_core::DomainError;

/// Failures raised by the product aggregate and its image rules.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// The original file name was empty, or the generated one is unusable.
    #[error("invalid image data: {0}")]
    InvalidImageData(String),

    #[error("image not found")]
    ImageNotFound,

    /// A product must always keep at least one image.
    #[error("product image cannot be empty, at least one image is required")]
    ImageCannotBeEmpty,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ProductError {
    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImageData(msg.into())
    }
}

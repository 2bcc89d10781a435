use thiserror::Error;

use catalog_products::ProductError;

use crate::blob_store::BlobStoreError;
use crate::metadata_store::MetadataStoreError;

/// Caller-visible failures of the catalog use cases.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("product not found")]
    ProductNotFound,

    #[error("product images not found")]
    ProductImagesNotFound,

    #[error("product image cannot be empty, at least one image is required")]
    ProductImageCannotBeEmpty,

    #[error("image not found")]
    ImageNotFound,

    #[error("invalid image data: {0}")]
    InvalidImageData(String),

    #[error("invalid product image: {0}")]
    InvalidProductImage(String),

    #[error("invalid product data: {0}")]
    InvalidProductData(String),

    /// Batch blob removal failed during product deletion; the product was kept.
    #[error("failed to delete product images from storage: {0}")]
    DeleteImagesStorage(String),

    #[error("bucket not found")]
    BucketNotFound,

    /// The image record is gone but its blob could not be removed.
    #[error("failed to delete file from bucket: {0}")]
    BucketDelete(BlobStoreError),

    #[error(transparent)]
    Storage(BlobStoreError),

    #[error(transparent)]
    Metadata(#[from] MetadataStoreError),
}

impl From<BlobStoreError> for CatalogError {
    fn from(err: BlobStoreError) -> Self {
        match err {
            BlobStoreError::BucketNotFound => CatalogError::BucketNotFound,
            other => CatalogError::Storage(other),
        }
    }
}

impl From<ProductError> for CatalogError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::InvalidImageData(msg) => CatalogError::InvalidImageData(msg),
            ProductError::ImageNotFound => CatalogError::ImageNotFound,
            ProductError::ImageCannotBeEmpty => CatalogError::ProductImageCannotBeEmpty,
            ProductError::Domain(e) => CatalogError::InvalidProductData(e.to_string()),
        }
    }
}

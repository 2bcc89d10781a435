use std::sync::Arc;

use tracing::{info, instrument};

use catalog_core::ProductId;
use catalog_products::Image;

use crate::error::CatalogError;
use crate::gateway::ProductImageGateway;
use crate::locks::ProductLocks;

#[derive(Debug, Clone)]
pub struct UploadProductImageInput {
    pub product_id: ProductId,
    /// Name supplied by the client; the stored name is generated from it.
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Attach a new photo to a product and make it the default.
pub struct UploadProductImage {
    gateway: Arc<ProductImageGateway>,
    locks: ProductLocks,
}

impl UploadProductImage {
    pub fn new(gateway: Arc<ProductImageGateway>, locks: ProductLocks) -> Self {
        Self { gateway, locks }
    }

    #[instrument(
        skip(self, input),
        fields(product_id = %input.product_id, original_file_name = %input.file_name),
        err
    )]
    pub async fn execute(&self, input: UploadProductImageInput) -> Result<Image, CatalogError> {
        let _guard = self.locks.lock(input.product_id).await;

        let mut product = self.gateway.find_by_id(input.product_id).await?;
        let file_name = product.add_image(&input.file_name, self.gateway.urls())?;

        self.gateway
            .add_and_set_default_image(&mut product, &file_name, input.content)
            .await?;

        let image = product.image(&file_name).cloned().ok_or(CatalogError::ImageNotFound)?;
        info!(product_id = %input.product_id, file_name = %file_name, "product image uploaded");
        Ok(image)
    }
}

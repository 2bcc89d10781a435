use std::sync::Arc;

use tracing::{info, instrument};

use catalog_core::ProductId;

use crate::error::CatalogError;
use crate::gateway::ProductImageGateway;
use crate::locks::ProductLocks;

/// Remove one photo from a product, promoting a successor when the default
/// image goes away.
pub struct DeleteProductImage {
    gateway: Arc<ProductImageGateway>,
    locks: ProductLocks,
}

impl DeleteProductImage {
    pub fn new(gateway: Arc<ProductImageGateway>, locks: ProductLocks) -> Self {
        Self { gateway, locks }
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    pub async fn execute(&self, product_id: ProductId, file_name: &str) -> Result<(), CatalogError> {
        let _guard = self.locks.lock(product_id).await;

        let mut product = self.gateway.find_by_id(product_id).await?;

        // Validate before touching either store.
        if product.images().len() == 1 {
            return Err(CatalogError::ProductImageCannotBeEmpty);
        }
        if product.image(file_name).is_none() {
            return Err(CatalogError::ImageNotFound);
        }

        self.gateway.promote_successor(&mut product, file_name).await?;
        self.gateway.delete_image(&mut product, file_name).await?;

        info!(product_id = %product_id, file_name, "product image deleted");
        Ok(())
    }
}

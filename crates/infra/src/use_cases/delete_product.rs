use std::sync::Arc;

use tracing::{info, instrument};

use catalog_core::ProductId;

use crate::error::CatalogError;
use crate::gateway::ProductImageGateway;
use crate::locks::ProductLocks;

/// Delete a product together with every one of its stored images.
pub struct DeleteProduct {
    gateway: Arc<ProductImageGateway>,
    locks: ProductLocks,
}

impl DeleteProduct {
    pub fn new(gateway: Arc<ProductImageGateway>, locks: ProductLocks) -> Self {
        Self { gateway, locks }
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    pub async fn execute(&self, product_id: ProductId) -> Result<(), CatalogError> {
        let _guard = self.locks.lock(product_id).await;

        let product = self.gateway.find_by_id(product_id).await?;
        self.gateway.delete_product(&product).await?;

        info!(product_id = %product_id, images = product.images().len(), "product deleted");
        Ok(())
    }
}

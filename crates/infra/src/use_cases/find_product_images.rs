use std::sync::Arc;

use tracing::instrument;

use catalog_core::ProductId;
use catalog_products::Image;

use crate::error::CatalogError;
use crate::gateway::ProductImageGateway;

/// Read-only listing of a product's images, oldest first.
pub struct FindAllImagesForProduct {
    gateway: Arc<ProductImageGateway>,
}

impl FindAllImagesForProduct {
    pub fn new(gateway: Arc<ProductImageGateway>) -> Self {
        Self { gateway }
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    pub async fn execute(&self, product_id: ProductId) -> Result<Vec<Image>, CatalogError> {
        let product = self.gateway.find_by_id(product_id).await?;
        Ok(product.images().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    #[tokio::test]
    async fn lists_images_oldest_first_without_writing() {
        let h = Harness::new();
        let id = h.seed_product(&[("a.png", false), ("b.png", false), ("c.png", true)]).await;

        let images = FindAllImagesForProduct::new(h.gateway.clone())
            .execute(id)
            .await
            .unwrap();

        let names: Vec<&str> = images.iter().map(|i| i.file_name()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
        assert!(h.journal.entries().iter().all(|e| e.starts_with("meta.find_")));
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let h = Harness::new();
        let err = FindAllImagesForProduct::new(h.gateway.clone())
            .execute(ProductId::new())
            .await
            .unwrap_err();
        assert_eq!(err, CatalogError::ProductNotFound);
    }
}

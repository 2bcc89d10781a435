use std::sync::Arc;

use tracing::instrument;

use catalog_core::ProductId;
use catalog_products::Product;

use crate::error::CatalogError;
use crate::gateway::ProductImageGateway;

pub struct FindProductById {
    gateway: Arc<ProductImageGateway>,
}

impl FindProductById {
    pub fn new(gateway: Arc<ProductImageGateway>) -> Self {
        Self { gateway }
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    pub async fn execute(&self, product_id: ProductId) -> Result<Product, CatalogError> {
        self.gateway.find_by_id(product_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    #[tokio::test]
    async fn loads_product_with_images() {
        let h = Harness::new();
        let id = h.seed_product(&[("a.png", false), ("b.png", true)]).await;

        let product = FindProductById::new(h.gateway.clone()).execute(id).await.unwrap();

        assert_eq!(product.name(), "X-Burger");
        let names: Vec<&str> = product.images().iter().map(|i| i.file_name()).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
        assert_eq!(product.default_image().unwrap().file_name(), "b.png");
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let h = Harness::new();
        let err = FindProductById::new(h.gateway.clone())
            .execute(ProductId::new())
            .await
            .unwrap_err();
        assert_eq!(err, CatalogError::ProductNotFound);
    }

    #[tokio::test]
    async fn empty_or_failed_listing_is_images_not_found() {
        let h = Harness::new();
        let bare = h.seed_product(&[]).await;
        let uc = FindProductById::new(h.gateway.clone());
        assert_eq!(uc.execute(bare).await.unwrap_err(), CatalogError::ProductImagesNotFound);

        let id = h.seed_product(&[("a.png", true)]).await;
        h.metadata.fail_on("find_images");
        assert_eq!(uc.execute(id).await.unwrap_err(), CatalogError::ProductImagesNotFound);
    }
}

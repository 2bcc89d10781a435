use std::sync::Arc;

use tracing::{info, instrument};

use catalog_core::{CategoryId, ProductId};
use catalog_products::Product;

use crate::error::CatalogError;
use crate::gateway::ProductImageGateway;

#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub active: bool,
}

/// Create a product carrying only the placeholder image.
pub struct CreateProduct {
    gateway: Arc<ProductImageGateway>,
}

impl CreateProduct {
    pub fn new(gateway: Arc<ProductImageGateway>) -> Self {
        Self { gateway }
    }

    #[instrument(skip(self, input), fields(category_id = %input.category_id), err)]
    pub async fn execute(&self, input: CreateProductInput) -> Result<Product, CatalogError> {
        let product = Product::create(
            ProductId::new(),
            input.category_id,
            &input.name,
            input.description,
            input.price,
            input.active,
            self.gateway.urls(),
        )?;

        self.gateway.insert(&product).await?;
        info!(product_id = %product.id_typed(), "product created");
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Harness, UPLOAD_BASE};
    use catalog_products::PLACEHOLDER_IMAGE_FILE_NAME;

    fn input(name: &str, price: f64) -> CreateProductInput {
        CreateProductInput {
            category_id: CategoryId::new(),
            name: name.to_string(),
            description: "bread, burger, cheese".to_string(),
            price,
            active: true,
        }
    }

    #[tokio::test]
    async fn new_product_has_only_the_placeholder_as_default() {
        let h = Harness::new();
        let product = CreateProduct::new(h.gateway.clone())
            .execute(input("X-Burger", 29.9))
            .await
            .unwrap();

        let images = h.images(product.id_typed()).await;
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].file_name, PLACEHOLDER_IMAGE_FILE_NAME);
        assert!(images[0].is_default);
        assert_eq!(images[0].url, format!("{UPLOAD_BASE}/{PLACEHOLDER_IMAGE_FILE_NAME}"));
        assert!(!h.journal.contains("blob."));
    }

    #[tokio::test]
    async fn invalid_fields_are_invalid_product_data() {
        let h = Harness::new();
        let uc = CreateProduct::new(h.gateway.clone());

        let err = uc.execute(input(" ", 10.0)).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidProductData(_)));

        let err = uc.execute(input("Soda", -1.0)).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidProductData(_)));

        assert!(!h.journal.contains("meta.insert_product"));
    }

    #[tokio::test]
    async fn store_failure_is_invalid_product_data() {
        let h = Harness::new();
        h.metadata.fail_on("insert_product");

        let err = CreateProduct::new(h.gateway.clone())
            .execute(input("Soda", 5.0))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidProductData(_)));
    }
}

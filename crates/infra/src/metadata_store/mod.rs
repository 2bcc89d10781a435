//! Metadata store boundary: persistence of product rows and image records.
//!
//! The gateway is the only caller. Implementations make no attempt to
//! coordinate with blob storage; ordering across the two stores is decided
//! by the gateway.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use catalog_core::{CategoryId, ImageId, ProductId};

pub use in_memory::InMemoryMetadataStore;
pub use postgres::PostgresMetadataStore;

/// Persisted product row (images live in their own table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub active: bool,
}

/// Persisted image row: `{id, product_id, file_name, url, is_default, created_at}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: ImageId,
    pub product_id: ProductId,
    pub file_name: String,
    pub url: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetadataStoreError {
    #[error("database error: {0}")]
    Database(String),

    /// Uniqueness or referential integrity rejected the write.
    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("connection pool closed")]
    PoolClosed,

    /// A stored row could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Relational store for products and their image records.
///
/// Writes that match no row (e.g. deleting an unknown image) succeed as
/// no-ops, the way SQL `UPDATE`/`DELETE` statements do.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a product row together with its initial image records.
    async fn insert_product(
        &self,
        product: ProductRecord,
        images: Vec<ImageRecord>,
    ) -> Result<(), MetadataStoreError>;

    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRecord>, MetadataStoreError>;

    /// All images of a product, oldest first.
    async fn find_images(&self, product_id: ProductId) -> Result<Vec<ImageRecord>, MetadataStoreError>;

    async fn insert_image(&self, image: ImageRecord) -> Result<(), MetadataStoreError>;

    /// Flag one image as default. Other flags are left untouched.
    async fn set_image_as_default(
        &self,
        product_id: ProductId,
        image_id: ImageId,
    ) -> Result<(), MetadataStoreError>;

    /// Clear the default flag on every image of the product except `image_id`.
    async fn clear_default_except(
        &self,
        product_id: ProductId,
        image_id: ImageId,
    ) -> Result<(), MetadataStoreError>;

    async fn delete_image(&self, product_id: ProductId, file_name: &str) -> Result<(), MetadataStoreError>;

    /// Delete the product row; its image rows go with it.
    async fn delete_product(&self, product_id: ProductId) -> Result<(), MetadataStoreError>;
}

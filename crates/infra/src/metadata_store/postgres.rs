//! Postgres-backed metadata store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Code | MetadataStoreError |
//! |------------|-----------------|--------------------|
//! | Database (unique violation) | `23505` | `Constraint` |
//! | Database (foreign key violation) | `23503` | `Constraint` |
//! | Database (check violation) | `23514` | `Constraint` |
//! | Database (other) | any | `Database` |
//! | PoolClosed | n/a | `PoolClosed` |
//! | ColumnDecode / Decode | n/a | `Corrupt` |
//! | Other | n/a | `Database` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use catalog_core::{CategoryId, ImageId, ProductId};

use super::{ImageRecord, MetadataStore, MetadataStoreError, ProductRecord};

const SCHEMA: &str = include_str!("../../migrations/0001_catalog.sql");

#[derive(Debug, Clone)]
pub struct PostgresMetadataStore {
    pool: Arc<PgPool>,
}

impl PostgresMetadataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, MetadataStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the catalog tables if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), MetadataStoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    category_id: Uuid,
    name: String,
    description: String,
    price: f64,
    active: bool,
}

impl From<ProductRow> for ProductRecord {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::from_uuid(row.id),
            category_id: CategoryId::from_uuid(row.category_id),
            name: row.name,
            description: row.description,
            price: row.price,
            active: row.active,
        }
    }
}

#[derive(Debug, FromRow)]
struct ImageRow {
    id: Uuid,
    product_id: Uuid,
    file_name: String,
    url: String,
    is_default: bool,
    created_at: DateTime<Utc>,
}

impl From<ImageRow> for ImageRecord {
    fn from(row: ImageRow) -> Self {
        Self {
            id: ImageId::from_uuid(row.id),
            product_id: ProductId::from_uuid(row.product_id),
            file_name: row.file_name,
            url: row.url,
            is_default: row.is_default,
            created_at: row.created_at,
        }
    }
}

const INSERT_IMAGE: &str = r#"
    INSERT INTO product_images (id, product_id, file_name, url, is_default, created_at)
    VALUES ($1, $2, $3, $4, $5, $6)
"#;

#[async_trait]
impl MetadataStore for PostgresMetadataStore {
    #[instrument(skip(self, product, images), fields(product_id = %product.id, images = images.len()), err)]
    async fn insert_product(
        &self,
        product: ProductRecord,
        images: Vec<ImageRecord>,
    ) -> Result<(), MetadataStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO products (id, category_id, name, description, price, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(product.category_id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.active)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;

        for image in &images {
            sqlx::query(INSERT_IMAGE)
                .bind(image.id.as_uuid())
                .bind(image.product_id.as_uuid())
                .bind(&image.file_name)
                .bind(&image.url)
                .bind(image.is_default)
                .bind(image.created_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("insert_product_image", e))?;
        }

        tx.commit().await.map_err(|e| map_sqlx_error("commit", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRecord>, MetadataStoreError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, category_id, name, description, price, active
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_product", e))?;

        Ok(row.map(ProductRecord::from))
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn find_images(&self, product_id: ProductId) -> Result<Vec<ImageRecord>, MetadataStoreError> {
        let rows: Vec<ImageRow> = sqlx::query_as(
            r#"
            SELECT id, product_id, file_name, url, is_default, created_at
            FROM product_images
            WHERE product_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(product_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_images", e))?;

        Ok(rows.into_iter().map(ImageRecord::from).collect())
    }

    #[instrument(skip(self, image), fields(product_id = %image.product_id, file_name = %image.file_name), err)]
    async fn insert_image(&self, image: ImageRecord) -> Result<(), MetadataStoreError> {
        sqlx::query(INSERT_IMAGE)
            .bind(image.id.as_uuid())
            .bind(image.product_id.as_uuid())
            .bind(&image.file_name)
            .bind(&image.url)
            .bind(image.is_default)
            .bind(image.created_at)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_image", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %product_id, image_id = %image_id), err)]
    async fn set_image_as_default(
        &self,
        product_id: ProductId,
        image_id: ImageId,
    ) -> Result<(), MetadataStoreError> {
        sqlx::query("UPDATE product_images SET is_default = TRUE WHERE product_id = $1 AND id = $2")
            .bind(product_id.as_uuid())
            .bind(image_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_image_as_default", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %product_id, image_id = %image_id), err)]
    async fn clear_default_except(
        &self,
        product_id: ProductId,
        image_id: ImageId,
    ) -> Result<(), MetadataStoreError> {
        sqlx::query("UPDATE product_images SET is_default = FALSE WHERE product_id = $1 AND id <> $2")
            .bind(product_id.as_uuid())
            .bind(image_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("clear_default_except", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn delete_image(&self, product_id: ProductId, file_name: &str) -> Result<(), MetadataStoreError> {
        sqlx::query("DELETE FROM product_images WHERE product_id = $1 AND file_name = $2")
            .bind(product_id.as_uuid())
            .bind(file_name)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_image", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %product_id), err)]
    async fn delete_product(&self, product_id: ProductId) -> Result<(), MetadataStoreError> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> MetadataStoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("{operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("23505" | "23503" | "23514") => MetadataStoreError::Constraint(msg),
                _ => MetadataStoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => MetadataStoreError::PoolClosed,
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            MetadataStoreError::Corrupt(format!("{operation}: {err}"))
        }
        other => MetadataStoreError::Database(format!("{operation}: {other}")),
    }
}

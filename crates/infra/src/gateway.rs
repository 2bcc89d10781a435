//! Product image gateway.
//!
//! Translates between the [`Product`] aggregate and the two independent
//! stores. There is no shared transaction, so step order is the only
//! consistency tool:
//!
//! - upload: blob first, then metadata (a failed upload writes nothing)
//! - image delete: metadata first, then blob
//! - product delete: every blob first, then the product row
//!
//! A failure after the first step leaves an orphaned blob. That state is
//! logged at `warn` and left for an operator; nothing is rolled back.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use catalog_core::ProductId;
use catalog_products::{Image, ImageUrls, Product};

use crate::blob_store::{BlobStore, BlobStoreError};
use crate::error::CatalogError;
use crate::metadata_store::{ImageRecord, MetadataStore, ProductRecord};

#[derive(Clone)]
pub struct ProductImageGateway {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    urls: ImageUrls,
}

impl ProductImageGateway {
    pub fn new(metadata: Arc<dyn MetadataStore>, blobs: Arc<dyn BlobStore>, urls: ImageUrls) -> Self {
        Self { metadata, blobs, urls }
    }

    pub fn urls(&self) -> &ImageUrls {
        &self.urls
    }

    /// Persist a new product and its initial images.
    #[instrument(skip(self, product), fields(product_id = %product.id_typed()), err)]
    pub async fn insert(&self, product: &Product) -> Result<(), CatalogError> {
        let images = product
            .images()
            .iter()
            .map(|img| image_record(product.id_typed(), img))
            .collect();
        self.metadata
            .insert_product(product_record(product), images)
            .await
            .map_err(|e| CatalogError::InvalidProductData(e.to_string()))
    }

    /// Load the product row plus its images.
    #[instrument(skip(self), fields(product_id = %id), err)]
    pub async fn find_by_id(&self, id: ProductId) -> Result<Product, CatalogError> {
        let record = self
            .metadata
            .find_product(id)
            .await?
            .ok_or(CatalogError::ProductNotFound)?;

        let images = self.find_images(id).await?;
        if images.is_empty() {
            return Err(CatalogError::ProductImagesNotFound);
        }

        Product::restore(
            record.id,
            record.category_id,
            &record.name,
            record.description,
            record.price,
            record.active,
            images,
        )
        .map_err(CatalogError::from)
    }

    /// Images of a product, oldest first. Any store failure reads as
    /// [`CatalogError::ProductImagesNotFound`].
    pub async fn find_images(&self, product_id: ProductId) -> Result<Vec<Image>, CatalogError> {
        let records = self.metadata.find_images(product_id).await.map_err(|e| {
            warn!(product_id = %product_id, error = %e, "image listing failed");
            CatalogError::ProductImagesNotFound
        })?;

        records
            .into_iter()
            .map(|r| {
                Image::restore(r.id, r.file_name, r.url, r.is_default, r.created_at).map_err(|e| {
                    warn!(product_id = %product_id, error = %e, "stored image is unreadable");
                    CatalogError::ProductImagesNotFound
                })
            })
            .collect()
    }

    /// Store the blob for the newest image of `product` and persist it as
    /// the single default.
    ///
    /// `file_name` must already be in the aggregate (see
    /// [`Product::add_image`]). Blob errors pass through unchanged; metadata
    /// errors after a successful upload become `InvalidProductData`.
    #[instrument(skip(self, product, content), fields(product_id = %product.id_typed(), size = content.len()), err)]
    pub async fn add_and_set_default_image(
        &self,
        product: &mut Product,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<(), CatalogError> {
        let product_id = product.id_typed();

        self.blobs.upload(file_name, content).await?;
        info!(product_id = %product_id, file_name, "image uploaded to blob store");

        let url = self.image_url(file_name).await;
        product.set_image_url(file_name, url)?;

        let image = product.image(file_name).ok_or(CatalogError::ImageNotFound)?;
        let image_id = image.id_typed();
        let record = image_record(product_id, image);

        let persisted = async {
            self.metadata.insert_image(record).await?;
            self.metadata.clear_default_except(product_id, image_id).await
        }
        .await;

        if let Err(e) = persisted {
            warn!(
                product_id = %product_id,
                file_name,
                error = %e,
                "image metadata not persisted, blob left orphaned"
            );
            return Err(CatalogError::InvalidProductData(e.to_string()));
        }

        product.set_all_previous_images_as_not_default();
        Ok(())
    }

    /// If `file_name` is the default image, hand the flag to the most
    /// recently created remaining image, in the store first and then in
    /// `product`. Every other image loses the flag.
    #[instrument(skip(self, product), fields(product_id = %product.id_typed()), err)]
    pub async fn promote_successor(&self, product: &mut Product, file_name: &str) -> Result<(), CatalogError> {
        if !product.image_is_default(file_name) {
            return Ok(());
        }
        let Some(successor) = product.most_recent_image_excluding(file_name) else {
            return Ok(());
        };
        let successor_id = successor.id_typed();
        let product_id = product.id_typed();

        self.metadata.set_image_as_default(product_id, successor_id).await?;
        // An interrupted upload can leave a second default behind.
        self.metadata.clear_default_except(product_id, successor_id).await?;
        product.set_default_image(successor_id)?;
        info!(product_id = %product_id, image_id = %successor_id, "default image promoted");
        Ok(())
    }

    /// Remove an image record, then its blob (the placeholder blob is shared
    /// and always kept).
    #[instrument(skip(self, product), fields(product_id = %product.id_typed()), err)]
    pub async fn delete_image(&self, product: &mut Product, file_name: &str) -> Result<(), CatalogError> {
        let product_id = product.id_typed();
        let removed = product.remove_image(file_name)?;

        self.metadata
            .delete_image(product_id, file_name)
            .await
            .map_err(|e| CatalogError::InvalidProductImage(format!("failed to delete image from database: {e}")))?;

        if removed.is_placeholder() {
            return Ok(());
        }

        if let Err(e) = self.blobs.delete(file_name).await {
            warn!(product_id = %product_id, file_name, error = %e, "image record deleted, blob left orphaned");
            return Err(CatalogError::BucketDelete(e));
        }
        Ok(())
    }

    /// Delete every blob of `product` and then the product row.
    ///
    /// If the blobs cannot be removed the product row is kept.
    #[instrument(skip(self, product), fields(product_id = %product.id_typed()), err)]
    pub async fn delete_product(&self, product: &Product) -> Result<(), CatalogError> {
        let keys: Vec<String> = product
            .images()
            .iter()
            .filter(|img| !img.is_placeholder())
            .map(|img| img.file_name().to_string())
            .collect();

        if !keys.is_empty() {
            self.blobs
                .delete_many(&keys)
                .await
                .map_err(|e| CatalogError::DeleteImagesStorage(e.to_string()))?;
        }

        self.metadata.delete_product(product.id_typed()).await?;
        Ok(())
    }

    /// Fresh presigned URL for a stored blob. Stored image URLs expire or
    /// point at the derived base, so readers resolve them through here.
    #[instrument(skip(self), err)]
    pub async fn file_url(&self, file_name: &str) -> Result<String, CatalogError> {
        self.blobs.presigned_url(file_name).await.map_err(|e| match e {
            BlobStoreError::ObjectNotFound(_) | BlobStoreError::InvalidKey(_) => CatalogError::ImageNotFound,
            other => CatalogError::from(other),
        })
    }

    /// Presigned URL for a freshly stored blob, or the URL derived from the
    /// configured base when presigning fails.
    pub async fn image_url(&self, file_name: &str) -> String {
        match self.blobs.presigned_url(file_name).await {
            Ok(url) => url,
            Err(e) => {
                warn!(file_name, error = %e, "presigning failed, using derived image url");
                self.urls.url_for(file_name)
            }
        }
    }
}

fn product_record(product: &Product) -> ProductRecord {
    ProductRecord {
        id: product.id_typed(),
        category_id: product.category_id(),
        name: product.name().to_string(),
        description: product.description().to_string(),
        price: product.price().value(),
        active: product.is_active(),
    }
}

fn image_record(product_id: ProductId, image: &Image) -> ImageRecord {
    ImageRecord {
        id: image.id_typed(),
        product_id,
        file_name: image.file_name().to_string(),
        url: image.url().to_string(),
        is_default: image.is_default(),
        created_at: image.created_at(),
    }
}

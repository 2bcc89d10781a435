//! Store adapters and use cases, selected by configuration.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use catalog_infra::ProductImageGateway;
use catalog_infra::ProductLocks;
use catalog_infra::blob_store::{BlobStore, InMemoryBlobStore, LocalBlobStore, S3BlobStore};
use catalog_infra::config::{CatalogConfig, StorageBackend};
use catalog_infra::metadata_store::{InMemoryMetadataStore, MetadataStore, PostgresMetadataStore};
use catalog_infra::use_cases::{
    CreateProduct, DeleteProduct, DeleteProductImage, FindAllImagesForProduct, FindFile, FindProductById,
    UploadProductImage,
};
use catalog_products::PLACEHOLDER_IMAGE_FILE_NAME;

/// Use cases shared by every handler.
pub struct AppServices {
    pub create_product: CreateProduct,
    pub find_product: FindProductById,
    pub find_images: FindAllImagesForProduct,
    pub upload_image: UploadProductImage,
    pub delete_image: DeleteProductImage,
    pub delete_product: DeleteProduct,
    pub find_file: FindFile,
}

impl AppServices {
    pub fn new(gateway: Arc<ProductImageGateway>) -> Self {
        let locks = ProductLocks::new();
        Self {
            create_product: CreateProduct::new(gateway.clone()),
            find_product: FindProductById::new(gateway.clone()),
            find_images: FindAllImagesForProduct::new(gateway.clone()),
            upload_image: UploadProductImage::new(gateway.clone(), locks.clone()),
            delete_image: DeleteProductImage::new(gateway.clone(), locks.clone()),
            delete_product: DeleteProduct::new(gateway.clone(), locks),
            find_file: FindFile::new(gateway),
        }
    }
}

pub async fn build_services(config: &CatalogConfig) -> anyhow::Result<AppServices> {
    let metadata = metadata_store(config).await?;
    let blobs = blob_store(config).await?;
    let gateway = Arc::new(ProductImageGateway::new(metadata, blobs, config.image_urls()));
    Ok(AppServices::new(gateway))
}

async fn metadata_store(config: &CatalogConfig) -> anyhow::Result<Arc<dyn MetadataStore>> {
    let Some(url) = &config.database.url else {
        info!("DATABASE_URL not set; using in-memory metadata store");
        return Ok(Arc::new(InMemoryMetadataStore::new()));
    };

    let store = PostgresMetadataStore::connect(url, config.database.max_connections)
        .await
        .context("failed to connect to postgres")?;
    if config.database.run_migrations {
        store.migrate().await.context("failed to apply schema")?;
    }
    info!("using postgres metadata store");
    Ok(Arc::new(store))
}

async fn blob_store(config: &CatalogConfig) -> anyhow::Result<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.storage.backend {
        StorageBackend::S3 => {
            let s3 = config
                .storage
                .s3
                .as_ref()
                .context("AWS_S3_BUCKET_NAME is required for the s3 storage backend")?;
            info!(bucket = %s3.bucket, endpoint = ?s3.endpoint, "using s3 blob store");
            Arc::new(S3BlobStore::from_config(s3).await)
        }
        StorageBackend::Local => {
            let dir = &config.storage.local_dir;
            info!(dir = %dir.display(), "using local blob store");
            Arc::new(
                LocalBlobStore::open(dir.clone())
                    .await
                    .context("failed to open local storage directory")?,
            )
        }
        StorageBackend::Memory => {
            info!("using in-memory blob store");
            let store = InMemoryBlobStore::new(config.api.upload_url.clone());
            // Buckets ship with the shared placeholder; mirror that here.
            store
                .upload(PLACEHOLDER_IMAGE_FILE_NAME, Vec::new())
                .await
                .context("failed to seed placeholder image")?;
            Arc::new(store)
        }
    };
    Ok(store)
}

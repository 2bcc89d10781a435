//! Journaling, failure-injecting store doubles for gateway and use-case tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use catalog_core::{CategoryId, ImageId, ProductId};
use catalog_products::{ImageUrls, PLACEHOLDER_IMAGE_FILE_NAME};

use crate::blob_store::{BlobStore, BlobStoreError, InMemoryBlobStore};
use crate::gateway::ProductImageGateway;
use crate::locks::ProductLocks;
use crate::metadata_store::{
    ImageRecord, InMemoryMetadataStore, MetadataStore, MetadataStoreError, ProductRecord,
};

pub const UPLOAD_BASE: &str = "http://localhost:8080/uploads";

/// Ordered log of every store call, shared by both doubles.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn record(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    /// Position of the first entry starting with `prefix`.
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.entries().iter().position(|e| e.starts_with(prefix))
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.position(prefix).is_some()
    }
}

pub struct JournaledMetadata {
    inner: InMemoryMetadataStore,
    journal: Journal,
    failing: Mutex<HashSet<&'static str>>,
}

impl JournaledMetadata {
    pub fn fail_on(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    fn call(&self, op: &'static str, detail: impl std::fmt::Display) -> Result<(), MetadataStoreError> {
        self.journal.record(format!("meta.{op} {detail}"));
        if self.failing.lock().unwrap().contains(op) {
            return Err(MetadataStoreError::Database(format!("injected {op} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for JournaledMetadata {
    async fn insert_product(
        &self,
        product: ProductRecord,
        images: Vec<ImageRecord>,
    ) -> Result<(), MetadataStoreError> {
        self.call("insert_product", product.id)?;
        self.inner.insert_product(product, images).await
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRecord>, MetadataStoreError> {
        self.call("find_product", id)?;
        self.inner.find_product(id).await
    }

    async fn find_images(&self, product_id: ProductId) -> Result<Vec<ImageRecord>, MetadataStoreError> {
        self.call("find_images", product_id)?;
        self.inner.find_images(product_id).await
    }

    async fn insert_image(&self, image: ImageRecord) -> Result<(), MetadataStoreError> {
        self.call("insert_image", &image.file_name)?;
        self.inner.insert_image(image).await
    }

    async fn set_image_as_default(
        &self,
        product_id: ProductId,
        image_id: ImageId,
    ) -> Result<(), MetadataStoreError> {
        self.call("set_image_as_default", image_id)?;
        self.inner.set_image_as_default(product_id, image_id).await
    }

    async fn clear_default_except(
        &self,
        product_id: ProductId,
        image_id: ImageId,
    ) -> Result<(), MetadataStoreError> {
        self.call("clear_default_except", image_id)?;
        self.inner.clear_default_except(product_id, image_id).await
    }

    async fn delete_image(&self, product_id: ProductId, file_name: &str) -> Result<(), MetadataStoreError> {
        self.call("delete_image", file_name)?;
        self.inner.delete_image(product_id, file_name).await
    }

    async fn delete_product(&self, product_id: ProductId) -> Result<(), MetadataStoreError> {
        self.call("delete_product", product_id)?;
        self.inner.delete_product(product_id).await
    }
}

pub struct JournaledBlobs {
    inner: InMemoryBlobStore,
    journal: Journal,
    failing: Mutex<HashSet<&'static str>>,
    failing_keys: Mutex<HashSet<String>>,
}

impl JournaledBlobs {
    pub fn fail_on(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    /// Any delete touching `key` fails.
    pub fn fail_deleting(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    /// Drop `key` without journaling it, as if the object vanished.
    pub async fn lose(&self, key: &str) {
        self.inner.delete(key).await.unwrap();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains(key)
    }

    fn call(&self, op: &'static str, detail: impl std::fmt::Display) -> Result<(), BlobStoreError> {
        self.journal.record(format!("blob.{op} {detail}"));
        if self.failing.lock().unwrap().contains(op) {
            return Err(BlobStoreError::Transport(format!("injected {op} failure")));
        }
        Ok(())
    }

    fn check_key(&self, key: &str) -> Result<(), BlobStoreError> {
        if self.failing_keys.lock().unwrap().contains(key) {
            return Err(BlobStoreError::Transport(format!("injected failure deleting {key}")));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for JournaledBlobs {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobStoreError> {
        self.call("upload", key)?;
        self.inner.upload(key, bytes).await
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        self.call("delete", key)?;
        self.check_key(key)?;
        self.inner.delete(key).await
    }

    async fn delete_many(&self, keys: &[String]) -> Result<(), BlobStoreError> {
        self.call("delete_many", keys.join(","))?;
        for key in keys {
            self.check_key(key)?;
        }
        self.inner.delete_many(keys).await
    }

    async fn presigned_url(&self, key: &str) -> Result<String, BlobStoreError> {
        self.call("presigned_url", key)?;
        self.inner.presigned_url(key).await
    }
}

pub struct Harness {
    pub journal: Journal,
    pub metadata: Arc<JournaledMetadata>,
    pub blobs: Arc<JournaledBlobs>,
    pub gateway: Arc<ProductImageGateway>,
    pub locks: ProductLocks,
}

impl Harness {
    pub fn new() -> Self {
        let journal = Journal::default();
        let metadata = Arc::new(JournaledMetadata {
            inner: InMemoryMetadataStore::new(),
            journal: journal.clone(),
            failing: Mutex::default(),
        });
        let blobs = Arc::new(JournaledBlobs {
            inner: InMemoryBlobStore::new("https://signed.example"),
            journal: journal.clone(),
            failing: Mutex::default(),
            failing_keys: Mutex::default(),
        });
        let gateway = Arc::new(ProductImageGateway::new(
            metadata.clone(),
            blobs.clone(),
            ImageUrls::new(UPLOAD_BASE),
        ));

        Self {
            journal,
            metadata,
            blobs,
            gateway,
            locks: ProductLocks::new(),
        }
    }

    /// Insert a product whose images are created in slice order (oldest
    /// first). Non-placeholder images also get a blob. The journal is
    /// cleared afterwards.
    pub async fn seed_product(&self, images: &[(&str, bool)]) -> ProductId {
        let id = ProductId::new();
        let base = Utc::now() - Duration::hours(1);
        let records = images
            .iter()
            .enumerate()
            .map(|(i, (file_name, is_default))| ImageRecord {
                id: ImageId::new(),
                product_id: id,
                file_name: file_name.to_string(),
                url: format!("{UPLOAD_BASE}/{file_name}"),
                is_default: *is_default,
                created_at: base + Duration::seconds(i as i64),
            })
            .collect();

        self.metadata
            .inner
            .insert_product(
                ProductRecord {
                    id,
                    category_id: CategoryId::new(),
                    name: "X-Burger".to_string(),
                    description: "bread, burger, cheese".to_string(),
                    price: 29.9,
                    active: true,
                },
                records,
            )
            .await
            .unwrap();

        for (file_name, _) in images {
            if *file_name != PLACEHOLDER_IMAGE_FILE_NAME {
                self.blobs.inner.upload(file_name, b"img".to_vec()).await.unwrap();
            }
        }

        self.journal.clear();
        id
    }

    pub async fn images(&self, id: ProductId) -> Vec<ImageRecord> {
        self.metadata.inner.find_images(id).await.unwrap()
    }

    pub async fn product_exists(&self, id: ProductId) -> bool {
        self.metadata.inner.find_product(id).await.unwrap().is_some()
    }

    pub async fn default_names(&self, id: ProductId) -> Vec<String> {
        self.images(id)
            .await
            .into_iter()
            .filter(|img| img.is_default)
            .map(|img| img.file_name)
            .collect()
    }
}

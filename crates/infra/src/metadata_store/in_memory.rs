use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use catalog_core::{ImageId, ProductId};

use super::{ImageRecord, MetadataStore, MetadataStoreError, ProductRecord};

#[derive(Debug, Default)]
struct Tables {
    products: HashMap<ProductId, ProductRecord>,
    images: HashMap<ImageId, ImageRecord>,
}

/// In-memory metadata store.
///
/// Intended for tests/dev. Enforces the same key and foreign-key rules as the
/// SQL schema.
#[derive(Debug, Default)]
pub struct InMemoryMetadataStore {
    tables: RwLock<Tables>,
}

impl InMemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, MetadataStoreError> {
        self.tables
            .read()
            .map_err(|_| MetadataStoreError::Database("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, MetadataStoreError> {
        self.tables
            .write()
            .map_err(|_| MetadataStoreError::Database("lock poisoned".to_string()))
    }
}

fn insert_image_row(tables: &mut Tables, image: ImageRecord) -> Result<(), MetadataStoreError> {
    if !tables.products.contains_key(&image.product_id) {
        return Err(MetadataStoreError::Constraint(format!(
            "product {} does not exist",
            image.product_id
        )));
    }
    if tables.images.contains_key(&image.id) {
        return Err(MetadataStoreError::Constraint(format!(
            "image {} already exists",
            image.id
        )));
    }
    tables.images.insert(image.id, image);
    Ok(())
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn insert_product(
        &self,
        product: ProductRecord,
        images: Vec<ImageRecord>,
    ) -> Result<(), MetadataStoreError> {
        let mut tables = self.write()?;
        if tables.products.contains_key(&product.id) {
            return Err(MetadataStoreError::Constraint(format!(
                "product {} already exists",
                product.id
            )));
        }
        if let Some(stray) = images.iter().find(|img| img.product_id != product.id) {
            return Err(MetadataStoreError::Constraint(format!(
                "image {} belongs to product {}",
                stray.id, stray.product_id
            )));
        }

        // All-or-nothing, like the SQL transaction.
        let mut staged = Tables {
            products: HashMap::from([(product.id, product.clone())]),
            images: HashMap::new(),
        };
        for image in images {
            if tables.images.contains_key(&image.id) {
                return Err(MetadataStoreError::Constraint(format!(
                    "image {} already exists",
                    image.id
                )));
            }
            insert_image_row(&mut staged, image)?;
        }

        tables.products.extend(staged.products);
        tables.images.extend(staged.images);
        Ok(())
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<ProductRecord>, MetadataStoreError> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    async fn find_images(&self, product_id: ProductId) -> Result<Vec<ImageRecord>, MetadataStoreError> {
        let tables = self.read()?;
        let mut images: Vec<ImageRecord> = tables
            .images
            .values()
            .filter(|img| img.product_id == product_id)
            .cloned()
            .collect();
        images.sort_by_key(|img| (img.created_at, img.id));
        Ok(images)
    }

    async fn insert_image(&self, image: ImageRecord) -> Result<(), MetadataStoreError> {
        let mut tables = self.write()?;
        insert_image_row(&mut tables, image)
    }

    async fn set_image_as_default(
        &self,
        product_id: ProductId,
        image_id: ImageId,
    ) -> Result<(), MetadataStoreError> {
        let mut tables = self.write()?;
        if let Some(img) = tables.images.get_mut(&image_id) {
            if img.product_id == product_id {
                img.is_default = true;
            }
        }
        Ok(())
    }

    async fn clear_default_except(
        &self,
        product_id: ProductId,
        image_id: ImageId,
    ) -> Result<(), MetadataStoreError> {
        let mut tables = self.write()?;
        for img in tables.images.values_mut() {
            if img.product_id == product_id && img.id != image_id {
                img.is_default = false;
            }
        }
        Ok(())
    }

    async fn delete_image(&self, product_id: ProductId, file_name: &str) -> Result<(), MetadataStoreError> {
        let mut tables = self.write()?;
        tables
            .images
            .retain(|_, img| !(img.product_id == product_id && img.file_name == file_name));
        Ok(())
    }

    async fn delete_product(&self, product_id: ProductId) -> Result<(), MetadataStoreError> {
        let mut tables = self.write()?;
        tables.products.remove(&product_id);
        tables.images.retain(|_, img| img.product_id != product_id);
        Ok(())
    }
}

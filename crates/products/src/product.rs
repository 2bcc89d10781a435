use serde::{Deserialize, Serialize};

use catalog_core::{CategoryId, DomainError, Entity, ImageId, ProductId, ValueObject};

use crate::error::ProductError;
use crate::image::{Image, ImageUrls};

const MAX_NAME_LEN: usize = 255;

/// Product display name (non-blank, bounded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductName(String);

impl ProductName {
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "name cannot exceed {MAX_NAME_LEN} characters"
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for ProductName {}

/// Unit price; always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(DomainError::validation("price must be greater than zero"));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl ValueObject for Price {}

/// Aggregate root: Product.
///
/// Owns the product's photo collection. Invariants once any operation has
/// completed:
/// - `images` is never empty (a placeholder is attached at creation)
/// - at most one image is flagged default
///
/// Methods here only mutate memory. Persisting the change, and ordering it
/// against blob storage, is the gateway's job.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id: ProductId,
    category_id: CategoryId,
    name: ProductName,
    description: String,
    price: Price,
    active: bool,
    images: Vec<Image>,
}

impl Product {
    /// Create a brand-new product carrying only the placeholder image.
    pub fn create(
        id: ProductId,
        category_id: CategoryId,
        name: &str,
        description: impl Into<String>,
        price: f64,
        active: bool,
        urls: &ImageUrls,
    ) -> Result<Self, ProductError> {
        Ok(Self {
            id,
            category_id,
            name: ProductName::new(name)?,
            description: description.into(),
            price: Price::new(price)?,
            active,
            images: vec![Image::placeholder(urls)],
        })
    }

    /// Rehydrate a product from persisted state.
    pub fn restore(
        id: ProductId,
        category_id: CategoryId,
        name: &str,
        description: impl Into<String>,
        price: f64,
        active: bool,
        images: Vec<Image>,
    ) -> Result<Self, ProductError> {
        if images.is_empty() {
            return Err(ProductError::ImageCannotBeEmpty);
        }

        Ok(Self {
            id,
            category_id,
            name: ProductName::new(name)?,
            description: description.into(),
            price: Price::new(price)?,
            active,
            images,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn image(&self, file_name: &str) -> Option<&Image> {
        self.images.iter().find(|img| img.file_name() == file_name)
    }

    pub fn default_image(&self) -> Option<&Image> {
        self.images.iter().find(|img| img.is_default())
    }

    /// Name a new upload and append it as default.
    ///
    /// Other images keep their default flag until
    /// [`set_all_previous_images_as_not_default`](Self::set_all_previous_images_as_not_default)
    /// is called after persistence succeeds.
    pub fn add_image(&mut self, original_file_name: &str, urls: &ImageUrls) -> Result<String, ProductError> {
        let image = Image::uploaded(original_file_name, urls)?;
        let file_name = image.file_name().to_string();
        self.images.push(image);
        Ok(file_name)
    }

    /// Remove the first image named `file_name`. The last image can never be removed.
    pub fn remove_image(&mut self, file_name: &str) -> Result<Image, ProductError> {
        if self.images.len() == 1 {
            return Err(ProductError::ImageCannotBeEmpty);
        }

        let idx = self
            .images
            .iter()
            .position(|img| img.file_name() == file_name)
            .ok_or(ProductError::ImageNotFound)?;

        Ok(self.images.remove(idx))
    }

    pub fn image_is_default(&self, file_name: &str) -> bool {
        self.images
            .iter()
            .any(|img| img.file_name() == file_name && img.is_default())
    }

    /// Clear the default flag on every image except the most recently added one.
    pub fn set_all_previous_images_as_not_default(&mut self) {
        let Some((_latest, previous)) = self.images.split_last_mut() else {
            return;
        };
        for img in previous {
            img.set_default(false);
        }
    }

    /// The newest image (by creation time) other than `excluded_file_name`.
    ///
    /// Ties on `created_at` go to the image added later.
    pub fn most_recent_image_excluding(&self, excluded_file_name: &str) -> Option<&Image> {
        self.images
            .iter()
            .enumerate()
            .filter(|(_, img)| img.file_name() != excluded_file_name)
            .max_by_key(|(idx, img)| (img.created_at(), *idx))
            .map(|(_, img)| img)
    }

    /// Make `image_id` the single default image.
    pub fn set_default_image(&mut self, image_id: ImageId) -> Result<(), ProductError> {
        if !self.images.iter().any(|img| img.id_typed() == image_id) {
            return Err(ProductError::ImageNotFound);
        }
        for img in &mut self.images {
            img.set_default(img.id_typed() == image_id);
        }
        Ok(())
    }

    pub fn set_image_url(&mut self, file_name: &str, url: impl Into<String>) -> Result<(), ProductError> {
        let img = self
            .images
            .iter_mut()
            .find(|img| img.file_name() == file_name)
            .ok_or(ProductError::ImageNotFound)?;
        img.set_url(url.into());
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

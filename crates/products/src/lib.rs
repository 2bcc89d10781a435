//! Products domain module.
//!
//! This crate contains the catalog's product aggregate and the rules governing
//! its photo collection, implemented purely as deterministic domain logic
//! (no IO, no HTTP, no storage).

pub mod error;
pub mod image;
pub mod naming;
pub mod product;

pub use error::ProductError;
pub use image::{Image, ImageUrls, PLACEHOLDER_IMAGE_FILE_NAME};
pub use naming::{generate_file_name, MAX_FILE_NAME_LEN};
pub use product::{Price, Product, ProductName};

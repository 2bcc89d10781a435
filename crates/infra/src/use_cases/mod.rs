//! Use cases: one orchestrated operation each, built on the gateway.
//!
//! Image-mutating use cases hold the product's lock from
//! [`ProductLocks`](crate::locks::ProductLocks) for their whole run.

mod create_product;
mod delete_product;
mod delete_product_image;
mod find_file;
mod find_product;
mod find_product_images;
mod upload_product_image;

pub use create_product::{CreateProduct, CreateProductInput};
pub use delete_product::DeleteProduct;
pub use delete_product_image::DeleteProductImage;
pub use find_file::FindFile;
pub use find_product::FindProductById;
pub use find_product_images::FindAllImagesForProduct;
pub use upload_product_image::{UploadProductImage, UploadProductImageInput};

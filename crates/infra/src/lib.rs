//! Infrastructure layer: configuration, store adapters, the product image
//! gateway and the use cases built on it.

pub mod blob_store;
pub mod config;
pub mod error;
pub mod gateway;
pub mod locks;
pub mod metadata_store;
pub mod use_cases;

#[cfg(test)]
mod testing;

pub use error::CatalogError;
pub use gateway::ProductImageGateway;
pub use locks::ProductLocks;

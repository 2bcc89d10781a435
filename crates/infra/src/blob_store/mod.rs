//! Blob store boundary: upload, delete and presign against a content store.

pub mod in_memory;
pub mod local;
pub mod s3;

use async_trait::async_trait;
use thiserror::Error;

pub use in_memory::InMemoryBlobStore;
pub use local::LocalBlobStore;
pub use s3::S3BlobStore;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlobStoreError {
    #[error("bucket not found")]
    BucketNotFound,

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("object already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("presign failed: {0}")]
    Presign(String),
}

/// Key/value content store addressed by image file name.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobStoreError>;

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError>;

    /// Delete every key. Any failure fails the whole call.
    async fn delete_many(&self, keys: &[String]) -> Result<(), BlobStoreError>;

    /// Time-limited GET URL for `key`.
    async fn presigned_url(&self, key: &str) -> Result<String, BlobStoreError>;
}

/// MIME type guessed from the key's extension.
pub fn content_type_for(key: &str) -> &'static str {
    let ext = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_is_case_insensitive() {
        assert_eq!(content_type_for("a_1.JPG"), "image/jpeg");
        assert_eq!(content_type_for("default_product_image.webp"), "image/webp");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}

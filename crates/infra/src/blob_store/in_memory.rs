use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{BlobStore, BlobStoreError};

/// In-memory blob store (dev/tests).
#[derive(Debug)]
pub struct InMemoryBlobStore {
    url_base: String,
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// `url_base` prefixes the URLs handed out by `presigned_url`.
    pub fn new(url_base: impl Into<String>) -> Self {
        Self {
            url_base: url_base.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects
            .read()
            .map(|objects| objects.contains_key(key))
            .unwrap_or(false)
    }

    #[cfg(test)]
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().ok()?.get(key).cloned()
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new("memory://blobs")
    }
}

fn poisoned() -> BlobStoreError {
    BlobStoreError::Io("lock poisoned".to_string())
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobStoreError> {
        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        objects.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        objects
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| BlobStoreError::ObjectNotFound(key.to_string()))
    }

    async fn delete_many(&self, keys: &[String]) -> Result<(), BlobStoreError> {
        let mut objects = self.objects.write().map_err(|_| poisoned())?;
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }

    async fn presigned_url(&self, key: &str) -> Result<String, BlobStoreError> {
        if !self.contains(key) {
            return Err(BlobStoreError::ObjectNotFound(key.to_string()));
        }
        Ok(format!("{}/{key}", self.url_base))
    }
}

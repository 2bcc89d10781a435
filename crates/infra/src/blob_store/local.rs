//! Filesystem blob store: one file per key under a base directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;

use super::{BlobStore, BlobStoreError};

#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    /// Use `root` as the storage directory, creating it if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, BlobStoreError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| BlobStoreError::Io(format!("create {}: {e}", root.display())))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, BlobStoreError> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(BlobStoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()), err)]
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobStoreError> {
        let path = self.path_for(key)?;
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => BlobStoreError::AlreadyExists(key.to_string()),
                _ => BlobStoreError::Io(format!("open {}: {e}", path.display())),
            })?;
        file.write_all(&bytes)
            .await
            .map_err(|e| BlobStoreError::Io(format!("write {}: {e}", path.display())))?;
        file.flush()
            .await
            .map_err(|e| BlobStoreError::Io(format!("flush {}: {e}", path.display())))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        let path = self.path_for(key)?;
        fs::remove_file(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => BlobStoreError::ObjectNotFound(key.to_string()),
            _ => BlobStoreError::Io(format!("remove {}: {e}", path.display())),
        })
    }

    #[instrument(skip(self, keys), fields(count = keys.len()), err)]
    async fn delete_many(&self, keys: &[String]) -> Result<(), BlobStoreError> {
        for key in keys {
            match self.delete(key).await {
                Ok(()) | Err(BlobStoreError::ObjectNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    async fn presigned_url(&self, key: &str) -> Result<String, BlobStoreError> {
        let path = self.path_for(key)?;
        if !fs::try_exists(&path)
            .await
            .map_err(|e| BlobStoreError::Io(format!("stat {}: {e}", path.display())))?
        {
            return Err(BlobStoreError::ObjectNotFound(key.to_string()));
        }
        let absolute = fs::canonicalize(&path)
            .await
            .map_err(|e| BlobStoreError::Presign(format!("{}: {e}", path.display())))?;
        Ok(format!("file://{}", absolute.display()))
    }
}

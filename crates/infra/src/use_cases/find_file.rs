use std::sync::Arc;

use tracing::instrument;

use crate::error::CatalogError;
use crate::gateway::ProductImageGateway;

/// Resolves a stored file name to a URL that can be fetched right now.
pub struct FindFile {
    gateway: Arc<ProductImageGateway>,
}

impl FindFile {
    pub fn new(gateway: Arc<ProductImageGateway>) -> Self {
        Self { gateway }
    }

    #[instrument(skip(self), err)]
    pub async fn execute(&self, file_name: &str) -> Result<String, CatalogError> {
        self.gateway.file_url(file_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    #[tokio::test]
    async fn stored_file_gets_a_fresh_url() {
        let h = Harness::new();
        h.seed_product(&[("a.png", true)]).await;

        let url = FindFile::new(h.gateway.clone()).execute("a.png").await.unwrap();

        assert_eq!(url, "https://signed.example/a.png");
        assert_eq!(h.journal.entries(), vec!["blob.presigned_url a.png".to_string()]);
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let h = Harness::new();
        let err = FindFile::new(h.gateway.clone()).execute("ghost.png").await.unwrap_err();
        assert_eq!(err, CatalogError::ImageNotFound);
    }

    #[tokio::test]
    async fn presign_failure_is_a_storage_error() {
        let h = Harness::new();
        h.seed_product(&[("a.png", true)]).await;
        h.blobs.fail_on("presigned_url");

        let err = FindFile::new(h.gateway.clone()).execute("a.png").await.unwrap_err();
        assert!(matches!(err, CatalogError::Storage(_)));
    }
}

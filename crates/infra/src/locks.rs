//! Per-product write serialisation.
//!
//! Image mutations on the same product hold that product's mutex for the
//! whole use case. Only writers inside this process are covered.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use catalog_core::ProductId;

#[derive(Debug, Default, Clone)]
pub struct ProductLocks {
    inner: Arc<Mutex<HashMap<ProductId, Arc<AsyncMutex<()>>>>>,
}

impl ProductLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `product_id`.
    pub async fn lock(&self, product_id: ProductId) -> OwnedMutexGuard<()> {
        let slot = {
            let mut map = match self.inner.lock() {
                Ok(map) => map,
                Err(poisoned) => poisoned.into_inner(),
            };
            // Drop slots nobody holds or waits on.
            map.retain(|id, slot| *id == product_id || Arc::strong_count(slot) > 1);
            map.entry(product_id).or_default().clone()
        };
        slot.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.inner.lock().map(|map| map.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_product_is_exclusive() {
        let locks = ProductLocks::new();
        let id = ProductId::new();

        let guard = locks.lock(id).await;
        let contender = tokio::spawn({
            let locks = locks.clone();
            async move {
                let _g = locks.lock(id).await;
            }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_products_do_not_block() {
        let locks = ProductLocks::new();
        let _a = locks.lock(ProductId::new()).await;
        let _b = tokio::time::timeout(Duration::from_millis(100), locks.lock(ProductId::new()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn released_slots_are_pruned() {
        let locks = ProductLocks::new();
        for _ in 0..10 {
            let _g = locks.lock(ProductId::new()).await;
        }
        let _g = locks.lock(ProductId::new()).await;
        assert_eq!(locks.tracked(), 1);
    }
}

use std::sync::Arc;

use async_trait::async_trait;

use receiver_core::ImageRecord;

use crate::error::StoreError;

/// Durable storage of image records.
///
/// Every call runs in its own transaction: it either commits before
/// returning `Ok` or is rolled back, so callers never observe a
/// half-written row.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Insert `image` and return it with the id the store assigned.
    async fn create(&self, image: ImageRecord) -> Result<ImageRecord, StoreError>;

    /// Look up a record by id. A missing row is [`StoreError::NotFound`].
    async fn read(&self, id: i64) -> Result<ImageRecord, StoreError>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Blanket implementation so `Arc<dyn ImageStore>` can be used directly.
#[async_trait]
impl<T: ImageStore + ?Sized> ImageStore for Arc<T> {
    async fn create(&self, image: ImageRecord) -> Result<ImageRecord, StoreError> {
        (**self).create(image).await
    }

    async fn read(&self, id: i64) -> Result<ImageRecord, StoreError> {
        (**self).read(id).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        (**self).health_check().await
    }
}

//! Hand-off of persisted images to the downstream processing queue.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::QueueError;

/// Publishes the id of a committed image record to downstream consumers.
///
/// One call is one delivery attempt. Implementations must not retry
/// internally; callers treat any error as terminal for that image.
#[async_trait]
pub trait ImageDispatcher: Send + Sync {
    async fn send(&self, id: i64) -> Result<(), QueueError>;
}

/// Blanket implementation so `Arc<dyn ImageDispatcher>` can be used directly.
#[async_trait]
impl<T: ImageDispatcher + ?Sized> ImageDispatcher for Arc<T> {
    async fn send(&self, id: i64) -> Result<(), QueueError> {
        (**self).send(id).await
    }
}

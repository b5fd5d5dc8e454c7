//! Intake pipeline: validate → persist → dispatch, one path at a time.
//!
//! Items in a batch are independent. A failure at any step is recorded
//! against that item and processing moves on; nothing already written or
//! sent is undone. Dispatch is only attempted once the row has committed.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use receiver_core::ImageRecord;
use receiver_queue::{ImageDispatcher, QueueError};
use receiver_storage::{ImageStore, StoreError};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("path cannot be an empty string")]
    EmptyPath,

    #[error("failed to save image: {0}")]
    Save(#[source] StoreError),

    #[error("timed out saving image after {0:?}")]
    SaveTimeout(Duration),

    #[error("store returned the saved image without an id")]
    MissingId,

    #[error("image saved with id {id} but failed to send it to the queue: {source}")]
    Dispatch {
        id: i64,
        #[source]
        source: QueueError,
    },
}

/// Result of one submitted path.
#[derive(Debug)]
pub struct ItemOutcome {
    /// Position in the submitted batch.
    pub index: usize,
    pub path: String,
    /// The assigned id when the image was saved and queued.
    pub result: Result<i64, IngestError>,
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Id of the persisted row, if the save is known to have succeeded.
    ///
    /// `None` means unknown, not unsaved: a [`IngestError::SaveTimeout`] can
    /// fire while the commit is already in flight, leaving a durable row
    /// whose id was never reported.
    pub fn saved_id(&self) -> Option<i64> {
        match &self.result {
            Ok(id) | Err(IngestError::Dispatch { id, .. }) => Some(*id),
            Err(_) => None,
        }
    }
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(id) => write!(f, "[{}] image saved with id {} and sent to the queue", self.index, id),
            Err(e) => write!(f, "[{}] {}", self.index, e),
        }
    }
}

/// Persists submitted paths and hands their ids to the queue.
///
/// Store and dispatcher are process-wide handles; the service itself holds
/// no mutable state, so one instance serves all requests concurrently.
#[derive(Clone)]
pub struct IngestService {
    store: Arc<dyn ImageStore>,
    dispatcher: Arc<dyn ImageDispatcher>,
    store_timeout: Duration,
}

impl IngestService {
    pub fn new(
        store: Arc<dyn ImageStore>,
        dispatcher: Arc<dyn ImageDispatcher>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            dispatcher,
            store_timeout,
        }
    }

    /// Submit a single path. Behaves exactly like a batch of one.
    pub async fn submit_one(&self, path: String) -> ItemOutcome {
        self.submit_item(0, path).await
    }

    /// Submit paths in order. Always returns one outcome per input path.
    pub async fn submit_batch(&self, paths: Vec<String>) -> Vec<ItemOutcome> {
        let total = paths.len();
        let mut outcomes = Vec::with_capacity(total);
        for (index, path) in paths.into_iter().enumerate() {
            outcomes.push(self.submit_item(index, path).await);
        }

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        info!(total, succeeded, failed = total - succeeded, "batch processed");
        outcomes
    }

    async fn submit_item(&self, index: usize, path: String) -> ItemOutcome {
        let result = self.process(&path).await;
        if let Err(e) = &result {
            warn!(index, path = %path, error = %e, "image submission failed");
        }
        ItemOutcome {
            index,
            path,
            result,
        }
    }

    async fn process(&self, path: &str) -> Result<i64, IngestError> {
        if path.is_empty() {
            return Err(IngestError::EmptyPath);
        }

        let image = ImageRecord::pending(path);
        let saved = tokio::time::timeout(self.store_timeout, self.store.create(image))
            .await
            .map_err(|_| IngestError::SaveTimeout(self.store_timeout))?
            .map_err(IngestError::Save)?;

        let id = saved.id.ok_or(IngestError::MissingId)?;

        self.dispatcher
            .send(id)
            .await
            .map_err(|source| IngestError::Dispatch { id, source })?;

        Ok(id)
    }
}

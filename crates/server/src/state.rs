use std::sync::Arc;
use std::time::Duration;

use receiver_storage::ImageStore;

use crate::ingest::IngestService;

/// Shared by every request handler. Holds only process-wide handles.
pub struct AppState {
    pub ingest: IngestService,
    pub store: Arc<dyn ImageStore>,
    /// Deadline for store round-trips made directly by handlers.
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        ingest: IngestService,
        store: Arc<dyn ImageStore>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            ingest,
            store,
            request_timeout,
        }
    }
}

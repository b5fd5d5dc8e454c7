//! In-memory stand-ins for the store and the queue.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use receiver_core::ImageRecord;
use receiver_queue::{ImageDispatcher, QueueError};
use receiver_server::{AppState, IngestService};
use receiver_storage::{ImageStore, StoreError};

/// Store that assigns ids 1, 2, 3, ... in insert order.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<ImageRecord>>,
    fail_paths: HashSet<String>,
    unreachable: bool,
    delay: Option<Duration>,
    create_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails as if the database were down.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// Inserts of these paths are rejected.
    pub fn failing_on(paths: &[&str]) -> Self {
        Self {
            fail_paths: paths.iter().map(|p| p.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Every call waits `delay` before answering.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<ImageRecord> {
        self.rows.lock().unwrap().clone()
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageStore for MemoryStore {
    async fn create(&self, image: ImageRecord) -> Result<ImageRecord, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unreachable {
            return Err(StoreError::Begin(sqlx::Error::PoolTimedOut));
        }
        if self.fail_paths.contains(&image.path) {
            return Err(StoreError::Statement(sqlx::Error::Protocol(
                "insert rejected".into(),
            )));
        }

        let mut rows = self.rows.lock().unwrap();
        let saved = image.with_id(rows.len() as i64 + 1);
        rows.push(saved.clone());
        Ok(saved)
    }

    async fn read(&self, id: i64) -> Result<ImageRecord, StoreError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unreachable {
            return Err(StoreError::Begin(sqlx::Error::PoolTimedOut));
        }
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == Some(id))
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unreachable {
            return Err(StoreError::Connect(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

/// Dispatcher that records every id it is asked to send.
#[derive(Default)]
pub struct RecordingDispatcher {
    sent: Mutex<Vec<i64>>,
    fail: bool,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the attempt, then fails it.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<i64> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageDispatcher for RecordingDispatcher {
    async fn send(&self, id: i64) -> Result<(), QueueError> {
        self.sent.lock().unwrap().push(id);
        if self.fail {
            return Err(QueueError::Timeout(Duration::from_millis(1)));
        }
        Ok(())
    }
}

pub const TIMEOUT: Duration = Duration::from_secs(2);

pub fn service(store: &Arc<MemoryStore>, dispatcher: &Arc<RecordingDispatcher>) -> IngestService {
    IngestService::new(store.clone(), dispatcher.clone(), TIMEOUT)
}

pub fn app_state(store: &Arc<MemoryStore>, dispatcher: &Arc<RecordingDispatcher>) -> Arc<AppState> {
    app_state_with_timeout(store, dispatcher, TIMEOUT)
}

pub fn app_state_with_timeout(
    store: &Arc<MemoryStore>,
    dispatcher: &Arc<RecordingDispatcher>,
    timeout: Duration,
) -> Arc<AppState> {
    let ingest = IngestService::new(store.clone(), dispatcher.clone(), timeout);
    Arc::new(AppState::new(ingest, store.clone(), timeout))
}

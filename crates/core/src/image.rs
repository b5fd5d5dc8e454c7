//! Image records as they move through intake.
//!
//! A record is created in the [`ImageStatus::Pending`] state, gets its `id`
//! from the store, and is later advanced by downstream consumers.

use serde::{Deserialize, Serialize};

use crate::error::ReceiverError;

/// Lifecycle state of an image. Stored as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    Pending,
    Processed,
    FailedProcessing,
}

impl ImageStatus {
    pub fn code(self) -> i32 {
        match self {
            ImageStatus::Pending => 0,
            ImageStatus::Processed => 1,
            ImageStatus::FailedProcessing => 2,
        }
    }
}

impl TryFrom<i32> for ImageStatus {
    type Error = ReceiverError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ImageStatus::Pending),
            1 => Ok(ImageStatus::Processed),
            2 => Ok(ImageStatus::FailedProcessing),
            other => Err(ReceiverError::UnknownStatus(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Assigned by the store on insert; `None` until then.
    pub id: Option<i64>,
    pub path: String,
    /// Owning person, unknown at intake.
    pub person_id: Option<i64>,
    pub status: ImageStatus,
}

impl ImageRecord {
    /// A fresh, not yet persisted record for `path`.
    pub fn pending(path: impl Into<String>) -> Self {
        Self {
            id: None,
            path: path.into(),
            person_id: None,
            status: ImageStatus::Pending,
        }
    }

    /// Copy of this record carrying the id the store assigned.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

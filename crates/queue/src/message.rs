//! What goes over the wire to image workers.
//!
//! Each frame is one MessagePack-encoded [`Message`]. The body is kept as
//! its own MessagePack blob so a worker can route on `topic` and check
//! `version` before committing to a payload type.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current envelope layout. Frames written before the field existed decode as 1.
pub const ENVELOPE_VERSION: u16 = 1;

/// Body of the message sent once an image row has committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageQueued {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub topic: String,
    #[serde(with = "msgpack_bin")]
    pub payload: Vec<u8>,
    pub timestamp: DateTime<Utc>,
    /// Fresh per dispatch; shows up in the receiver's `image dispatched` log.
    pub correlation_id: Uuid,
    #[serde(default = "envelope_version")]
    pub version: u16,
}

fn envelope_version() -> u16 {
    ENVELOPE_VERSION
}

impl Message {
    pub fn new<T: Serialize>(
        topic: impl Into<String>,
        body: &T,
    ) -> Result<Self, rmp_serde::encode::Error> {
        Ok(Self {
            topic: topic.into(),
            payload: rmp_serde::to_vec(body)?,
            timestamp: Utc::now(),
            correlation_id: Uuid::new_v4(),
            version: ENVELOPE_VERSION,
        })
    }

    /// Envelope announcing that image `id` awaits processing.
    pub fn image_queued(topic: impl Into<String>, id: i64) -> Result<Self, rmp_serde::encode::Error> {
        Self::new(topic, &ImageQueued { id })
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, rmp_serde::decode::Error> {
        rmp_serde::from_slice(&self.payload)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec(self)
    }

    pub fn from_bytes(frame: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(frame)
    }
}

// Write the payload as a MessagePack bin rather than an array of ints.
mod msgpack_bin {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(payload: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bytes(payload)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        <&[u8]>::deserialize(d).map(<[u8]>::to_vec)
    }
}

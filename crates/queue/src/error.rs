//! Queue error types.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("zeromq error: {0}")]
    Zmq(#[from] zeromq::ZmqError),

    #[error("send timed out after {0:?}")]
    Timeout(Duration),

    #[error("could not connect to {endpoint} within {timeout:?}")]
    ConnectTimeout { endpoint: String, timeout: Duration },
}

//! ZeroMQ PUSH dispatcher.
//!
//! Downstream workers bind PULL sockets; the receiver connects a PUSH socket
//! and ZeroMQ round-robins messages across whichever workers are attached.
//!
//! The PUSH socket does not reconnect on its own once its peer goes away.
//! A failed send therefore replaces the socket with a freshly connected one
//! before the error is returned, so the next send reaches a restarted worker.
//! A send that lands in the window between a worker dying and the socket
//! noticing can still return `Ok` and be lost; that gap belongs to the
//! transport.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, instrument, warn};
use zeromq::{PushSocket, Socket, SocketSend};

use crate::dispatcher::ImageDispatcher;
use crate::error::QueueError;
use crate::message::Message;
use crate::transport::Transport;

pub struct ZmqDispatcher {
    socket: Mutex<PushSocket>,
    endpoint: String,
    topic: String,
    send_timeout: Duration,
    connect_timeout: Duration,
}

/// Connect a fresh PUSH socket. zeromq keeps retrying a refused connection
/// forever, so the attempt is cut off at `limit`.
async fn connect_push(endpoint: &str, limit: Duration) -> Result<PushSocket, QueueError> {
    let mut socket = PushSocket::new();
    let connected = timeout(limit, socket.connect(endpoint)).await;
    match connected {
        Ok(result) => result?,
        Err(_) => {
            return Err(QueueError::ConnectTimeout {
                endpoint: endpoint.to_string(),
                timeout: limit,
            })
        }
    }
    Ok(socket)
}

impl ZmqDispatcher {
    /// Connect a PUSH socket to the queue endpoint, giving up after
    /// `connect_timeout`.
    #[instrument(skip_all, fields(endpoint = %transport))]
    pub async fn connect(
        transport: &Transport,
        topic: impl Into<String>,
        send_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, QueueError> {
        let endpoint = transport.endpoint();
        info!(endpoint = %endpoint, "connecting PUSH socket");
        let socket = connect_push(&endpoint, connect_timeout).await?;
        Ok(Self {
            socket: Mutex::new(socket),
            endpoint,
            topic: topic.into(),
            send_timeout,
            connect_timeout,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Swap in a new socket. On failure the old one stays and the next
    /// failed send tries again.
    async fn reconnect(&self, socket: &mut PushSocket) {
        match connect_push(&self.endpoint, self.connect_timeout).await {
            Ok(fresh) => {
                *socket = fresh;
                info!(endpoint = %self.endpoint, "PUSH socket reconnected");
            }
            Err(e) => warn!(endpoint = %self.endpoint, error = %e, "PUSH socket reconnect failed"),
        }
    }
}

#[async_trait]
impl ImageDispatcher for ZmqDispatcher {
    /// Push an [`ImageQueued`](crate::ImageQueued) envelope for `id`.
    ///
    /// Waiting for the socket lock and the send itself share one deadline.
    /// A reconnect after a failed send runs under the lock with its own
    /// connect bound, and the send error is still returned.
    #[instrument(skip(self), fields(topic = %self.topic))]
    async fn send(&self, id: i64) -> Result<(), QueueError> {
        let message = Message::image_queued(self.topic.as_str(), id)?;
        let correlation_id = message.correlation_id;
        let bytes = message.to_bytes()?;

        let deadline = Instant::now() + self.send_timeout;
        let mut socket = timeout_at(deadline, self.socket.lock())
            .await
            .map_err(|_| QueueError::Timeout(self.send_timeout))?;

        let sent = timeout_at(deadline, socket.send(bytes.into())).await;
        match sent {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(id, error = %e, "send failed, rebuilding PUSH socket");
                self.reconnect(&mut socket).await;
                return Err(e.into());
            }
            Err(_) => return Err(QueueError::Timeout(self.send_timeout)),
        }

        debug!(id, %correlation_id, "image dispatched");
        Ok(())
    }
}

pub mod dispatcher;
pub mod error;
pub mod message;
pub mod transport;
pub mod zmq;

pub use dispatcher::ImageDispatcher;
pub use error::QueueError;
pub use message::{ImageQueued, Message, ENVELOPE_VERSION};
pub use transport::Transport;
pub use zmq::ZmqDispatcher;

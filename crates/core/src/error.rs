use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReceiverError {
    #[error("unknown image status code: {0}")]
    UnknownStatus(i32),
}

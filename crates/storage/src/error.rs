use thiserror::Error;

use receiver_core::ReceiverError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid connection options: {0}")]
    Config(#[source] sqlx::Error),

    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed to start transaction: {0}")]
    Begin(#[source] sqlx::Error),

    #[error("failed to run statement: {0}")]
    Statement(#[source] sqlx::Error),

    #[error("failed to commit transaction: {0}")]
    Commit(#[source] sqlx::Error),

    #[error("image not found: {0}")]
    NotFound(i64),

    #[error("failed to decode image row: {0}")]
    Decode(#[from] ReceiverError),

    #[error("failed to run migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

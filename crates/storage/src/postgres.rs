//! PostgreSQL-backed [`ImageStore`].
//!
//! Each operation checks a connection out of the pool, opens a transaction
//! at `SERIALIZABLE`, runs its single statement, and commits or rolls back.
//! If the calling future is dropped mid-flight (deadline, cancelled
//! request), sqlx rolls the open transaction back when it is dropped and
//! the connection goes back to the pool.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument, warn};

use receiver_core::{ImageRecord, ImageStatus};

use crate::error::StoreError;
use crate::pool::ping;
use crate::store::ImageStore;

/// Row shape of the `images` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct ImageRow {
    pub id: i64,
    pub path: String,
    pub person: Option<i64>,
    pub status: i32,
}

impl TryFrom<ImageRow> for ImageRecord {
    type Error = StoreError;

    fn try_from(row: ImageRow) -> Result<Self, Self::Error> {
        Ok(ImageRecord {
            id: Some(row.id),
            path: row.path,
            person_id: row.person,
            status: ImageStatus::try_from(row.status)?,
        })
    }
}

#[derive(Clone)]
pub struct PgImageStore {
    pool: PgPool,
}

impl PgImageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::Begin)?;
        if let Err(e) = sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
        {
            rollback(tx).await;
            return Err(StoreError::Begin(e));
        }
        Ok(tx)
    }
}

/// Roll back after a failed statement. A rollback failure is only logged;
/// the statement error is what the caller gets.
async fn rollback(tx: Transaction<'static, Postgres>) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "failed to roll back transaction");
    }
}

#[async_trait]
impl ImageStore for PgImageStore {
    #[instrument(skip_all, fields(path = %image.path))]
    async fn create(&self, image: ImageRecord) -> Result<ImageRecord, StoreError> {
        debug!("saving image path");
        let mut tx = self.begin().await?;

        let inserted = sqlx::query_scalar::<_, i64>(
            "INSERT INTO images (path, person, status) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&image.path)
        .bind(image.person_id)
        .bind(image.status.code())
        .fetch_one(&mut *tx)
        .await;

        let id = match inserted {
            Ok(id) => id,
            Err(e) => {
                debug!(error = %e, "failed to run insert");
                rollback(tx).await;
                return Err(StoreError::Statement(e));
            }
        };

        tx.commit().await.map_err(StoreError::Commit)?;
        debug!(id, "image saved");
        Ok(image.with_id(id))
    }

    #[instrument(skip(self))]
    async fn read(&self, id: i64) -> Result<ImageRecord, StoreError> {
        let mut tx = self.begin().await?;

        let row = sqlx::query_as::<_, ImageRow>(
            "SELECT id, path, person, status FROM images WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await;

        let row = match row {
            Ok(row) => row,
            Err(e) => {
                rollback(tx).await;
                return Err(StoreError::Statement(e));
            }
        };

        tx.commit().await.map_err(StoreError::Commit)?;
        row.ok_or(StoreError::NotFound(id))?.try_into()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        ping(&self.pool).await
    }
}

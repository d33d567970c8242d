//! Durable FIFO of pending write requests.
//!
//! Each entry is an opaque serialized HTTP request. The queue never
//! discards an entry on its own: a row leaves `pending_writes` either
//! after the network confirmed the replay, or by being parked into
//! `dead_letters` once it has exhausted its replay attempts. Parked rows
//! are retained for inspection, not dropped.

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::Result;
use crate::local_db;

/// An HTTP-shaped write captured for later replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingWrite {
    pub id: Uuid,
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl PendingWrite {
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        headers: Vec<(String, String)>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            method: method.into(),
            url: url.into(),
            headers,
            body: body.into(),
        }
    }
}

/// A queue row: the write plus its replay bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedWrite {
    pub write: PendingWrite,
    pub attempts: u32,
    pub queued_at: String,
    pub last_error: Option<String>,
}

/// The durable write queue.
///
/// Opening the same file from several execution contexts is the intended
/// use; each context holds its own pool and SQLite arbitrates.
#[derive(Debug, Clone)]
pub struct WriteQueue {
    pool: SqlitePool,
}

impl WriteQueue {
    /// Open or create the queue database at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        let pool = local_db::open_pool(path).await?;
        Self::with_pool(pool).await
    }

    /// In-memory queue for tests.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = local_db::open_memory_pool().await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::raw_sql(include_str!("queue_schema.sql"))
            .execute(&pool)
            .await?;
        Ok(Self { pool })
    }

    /// Durably append a write. FIFO position comes from the monotonic
    /// `seq` column, never from timestamps.
    pub async fn enqueue(&self, write: &PendingWrite) -> Result<()> {
        sqlx::query(
            "INSERT INTO pending_writes (id, method, url, headers, body, queued_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(write.id.to_string())
        .bind(&write.method)
        .bind(&write.url)
        .bind(serde_json::to_string(&write.headers)?)
        .bind(&write.body)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The oldest pending write, if any.
    pub async fn front(&self) -> Result<Option<QueuedWrite>> {
        let row = sqlx::query(
            "SELECT id, method, url, headers, body, queued_at, attempts, last_error
             FROM pending_writes ORDER BY seq ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_queued).transpose()
    }

    /// All pending writes in replay order.
    pub async fn pending(&self) -> Result<Vec<QueuedWrite>> {
        let rows = sqlx::query(
            "SELECT id, method, url, headers, body, queued_at, attempts, last_error
             FROM pending_writes ORDER BY seq ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_queued).collect()
    }

    /// Remove a confirmed-delivered write. The only non-park way out of
    /// the queue.
    pub async fn remove(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM pending_writes WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Record a failed replay attempt.
    pub async fn record_failure(&self, id: Uuid, error: &str) -> Result<()> {
        sqlx::query(
            "UPDATE pending_writes SET
                 attempts = attempts + 1,
                 last_attempt = ?,
                 last_error = ?
             WHERE id = ?",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(error)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Move a write that has exhausted its attempts to the dead-letter
    /// table so it stops blocking replay of everything behind it.
    pub async fn park(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO dead_letters
                 (id, method, url, headers, body, queued_at, attempts, last_attempt, last_error, parked_at)
             SELECT id, method, url, headers, body, queued_at, attempts, last_attempt, last_error, ?
             FROM pending_writes WHERE id = ?",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM pending_writes WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Number of writes still waiting for replay.
    pub async fn len(&self) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM pending_writes")
            .fetch_one(&self.pool)
            .await?;
        let n: i64 = row.try_get("n")?;
        Ok(n as usize)
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Number of parked writes.
    pub async fn dead_letter_count(&self) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM dead_letters")
            .fetch_one(&self.pool)
            .await?;
        let n: i64 = row.try_get("n")?;
        Ok(n as usize)
    }
}

fn row_to_queued(row: &SqliteRow) -> Result<QueuedWrite> {
    let raw_id: String = row.try_get("id")?;
    let id = Uuid::parse_str(&raw_id)
        .map_err(|e| sqlx::Error::Protocol(format!("malformed queue row id '{raw_id}': {e}")))?;
    let headers: Vec<(String, String)> = serde_json::from_str(row.try_get("headers")?)?;
    let attempts: i64 = row.try_get("attempts")?;

    Ok(QueuedWrite {
        write: PendingWrite {
            id,
            method: row.try_get("method")?,
            url: row.try_get("url")?,
            headers,
            body: row.try_get("body")?,
        },
        attempts: attempts as u32,
        queued_at: row.try_get("queued_at")?,
        last_error: row.try_get("last_error")?,
    })
}

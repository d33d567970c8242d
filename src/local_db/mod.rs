//! # Local Store
//!
//! Durable local fallback storage for the event dashboard, backed by
//! SQLite via sqlx. Holds two of the three durable resources of this
//! system: the `events` collection keyed by event id and the `sync_meta`
//! scalar with the last successful sync time. (The third, the deferred
//! write queue, lives in its own database file; see `crate::offline`.)
//!
//! ## Guarantees
//!
//! - `save_events` is a single transaction: all given events are
//!   persisted or none are.
//! - Upserts are keyed by id, so re-saving a network result is always
//!   safe; no deduplication logic exists anywhere above this.
//! - `get_all_events` promises nothing about order. Callers that show
//!   events to a user must order them explicitly.
//! - The store never retries; a failed save surfaces as
//!   [`Error::Store`](crate::Error::Store) and the caller decides.

pub mod events;
pub mod sync_meta;

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::Result;

/// Open a SQLite pool at `path`, creating the file and parent directories
/// if needed, with the pragmas this crate runs with everywhere.
///
/// Shared with the write queue, which keeps its own database file but
/// wants identical connection behavior.
pub(crate) async fn open_pool(path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    // WAL so the foreground and the replay context can read and write the
    // same file without blocking each other.
    sqlx::query("PRAGMA journal_mode=WAL").execute(&pool).await?;
    sqlx::query("PRAGMA synchronous=NORMAL").execute(&pool).await?;
    sqlx::query("PRAGMA foreign_keys=ON").execute(&pool).await?;

    Ok(pool)
}

/// In-memory pool for tests. A single connection, because every SQLite
/// in-memory connection is its own database.
pub(crate) async fn open_memory_pool() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    Ok(pool)
}

/// Durable local store for events and sync metadata.
#[derive(Debug, Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    /// Open or create the store at `path` and initialize the schema.
    pub async fn open(path: &Path) -> Result<Self> {
        let pool = open_pool(path).await?;
        Self::with_pool(pool).await
    }

    /// In-memory store for tests.
    pub async fn open_in_memory() -> Result<Self> {
        let pool = open_memory_pool().await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::raw_sql(include_str!("schema.sql"))
            .execute(&pool)
            .await?;
        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

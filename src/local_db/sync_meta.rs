//! Sync metadata: the "last successful sync" scalar.
//!
//! Deliberately not transactional with the event store. The value only
//! feeds the user-facing "showing cached data as of ..." message, so
//! last-write-wins staleness is acceptable and never affects data
//! correctness.

use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::debug;

use crate::error::Result;
use crate::local_db::LocalStore;

const LAST_UPDATED_KEY: &str = "last_updated";

impl LocalStore {
    /// Timestamp of the last successful network read, if one ever
    /// completed.
    ///
    /// A value that fails to parse is treated as absent; the worst case
    /// is an offline banner without a date.
    pub async fn get_last_updated(&self) -> Result<Option<DateTime<Utc>>> {
        let row = sqlx::query("SELECT value FROM sync_meta WHERE key = ?")
            .bind(LAST_UPDATED_KEY)
            .fetch_optional(self.pool())
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: String = row.try_get("value")?;

        match DateTime::parse_from_rfc3339(&raw) {
            Ok(ts) => Ok(Some(ts.with_timezone(&Utc))),
            Err(err) => {
                debug!(value = %raw, error = %err, "unparseable last_updated, ignoring");
                Ok(None)
            }
        }
    }

    /// Overwrite the last successful sync timestamp.
    pub async fn set_last_updated(&self, ts: DateTime<Utc>) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO sync_meta (key, value) VALUES (?, ?)")
            .bind(LAST_UPDATED_KEY)
            .bind(ts.to_rfc3339())
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

//! Event storage operations.

use sqlx::Row;

use crate::error::Result;
use crate::event::Event;
use crate::local_db::LocalStore;

impl LocalStore {
    /// Upsert all given events as a single transaction.
    ///
    /// Either every event is persisted or none are: any individual
    /// failure aborts the transaction (dropping it without commit rolls
    /// back). Duplicate ids overwrite, so saving a fresh network result
    /// over older rows is idempotent.
    pub async fn save_events(&self, events: &[Event]) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        for event in events {
            sqlx::query(
                "INSERT INTO events (id, title, date, city, note)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                     title = excluded.title,
                     date = excluded.date,
                     city = excluded.city,
                     note = excluded.note",
            )
            .bind(event.id)
            .bind(&event.title)
            .bind(&event.date)
            .bind(&event.city)
            .bind(&event.note)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// All persisted events, in no particular order.
    ///
    /// An empty store yields an empty vec, not an error.
    pub async fn get_all_events(&self) -> Result<Vec<Event>> {
        let rows = sqlx::query("SELECT id, title, date, city, note FROM events")
            .fetch_all(self.pool())
            .await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            events.push(Event {
                id: row.try_get("id")?,
                title: row.try_get("title")?,
                date: row.try_get("date")?,
                city: row.try_get("city")?,
                note: row.try_get("note")?,
            });
        }
        Ok(events)
    }

    /// Number of stored events.
    pub async fn event_count(&self) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM events")
            .fetch_one(self.pool())
            .await?;
        let n: i64 = row.try_get("n")?;
        Ok(n as usize)
    }
}

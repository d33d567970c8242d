//! Event data model.
//!
//! Mirrors the server's JSON shape exactly: `{ id, title, date, city,
//! note }`. Events are identified by `id`, a millisecond timestamp
//! assigned at creation, and are never mutated afterwards; there is no
//! update or delete path in this system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dashboard event as the server serializes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Creation-time millisecond timestamp; unique and monotonically
    /// increasing across a client.
    pub id: i64,
    pub title: String,
    /// Free-text date string as entered by the user.
    pub date: String,
    pub city: String,
    pub note: String,
}

/// User-submitted event fields before an id has been assigned.
///
/// The foreground shell performs no validation; these are free-text
/// fields passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub date: String,
    pub city: String,
    pub note: String,
}

impl EventDraft {
    /// Promote the draft to a full event with the given id.
    pub fn into_event(self, id: i64) -> Event {
        Event {
            id,
            title: self.title,
            date: self.date,
            city: self.city,
            note: self.note,
        }
    }
}

impl Event {
    /// Creation time recovered from the id, when it parses as one.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp_millis(self.id)
    }
}

/// Order events for display.
///
/// Storage enumeration order is not a contract anywhere in this crate, so
/// any order the user sees is established here: ascending by id, which is
/// creation order.
pub fn sort_for_display(events: &mut [Event]) {
    events.sort_by_key(|event| event.id);
}

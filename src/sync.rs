//! # Sync Orchestrator
//!
//! The one component that knows both the network and the local store.
//!
//! Reads are network-first: a reachable server is authoritative and its
//! response is re-saved locally (staleness is preferable to
//! unavailability, so a dead network degrades to cached data instead of
//! an error). Writes are optimistic-local-first: the event is handed back
//! for immediate display, saved locally best-effort, and deferred into
//! the durable queue when the network write fails (data loss is worse
//! than temporary client/server inconsistency).
//!
//! The orchestrator owns its collaborators as plain fields, constructed
//! once at startup. There is no ambient storage and no module-level
//! connection anywhere in this crate.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::api_client::ApiClient;
use crate::config::Config;
use crate::error::Result;
use crate::event::{self, Event, EventDraft};
use crate::local_db::LocalStore;
use crate::offline::queue::WriteQueue;

/// Status condition for the foreground shell to display.
///
/// These are degraded-mode signals, not errors: every variant comes with
/// a perfectly usable `LoadOutcome` or `SubmitOutcome` next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCondition {
    /// Network read succeeded and the result was saved locally.
    Saved { at: DateTime<Utc> },
    /// Network read succeeded but the local save failed; the delivered
    /// events are still current, they just will not survive going
    /// offline.
    SaveFailed,
    /// Network read failed; showing cached data, stale as of
    /// `last_updated` (if a sync ever succeeded).
    Offline { last_updated: Option<DateTime<Utc>> },
    /// Network read failed and the local store has nothing to show.
    NoData,
}

/// Result of a read cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Events to render, ordered by id (creation order).
    pub events: Vec<Event>,
    pub status: StatusCondition,
}

/// How a submitted write left the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The server confirmed the write; it is now authoritative.
    Sent,
    /// The write could not be delivered and sits in the deferred queue.
    Deferred,
}

/// Result of a write cycle.
///
/// `event` and `persisted` are deliberately independent channels: the
/// event is always present for immediate optimistic display, while
/// `persisted` reports the separate best-effort local save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// The created event, for unconditional immediate display.
    pub event: Event,
    /// Whether the optimistic local save succeeded. `false` maps to the
    /// shell's save-error condition; nothing is rolled back.
    pub persisted: bool,
    pub delivery: Delivery,
}

/// Network-first read and optimistic write orchestration.
pub struct SyncOrchestrator {
    store: LocalStore,
    queue: WriteQueue,
    client: ApiClient,
}

impl SyncOrchestrator {
    /// Wire up store, queue, and client from configuration.
    pub async fn open(config: &Config) -> Result<Self> {
        let store = LocalStore::open(&config.events_db_path()).await?;
        let queue = WriteQueue::open(&config.queue_db_path()).await?;
        let client = ApiClient::new(config.clone())?;
        Ok(Self::with_parts(store, queue, client))
    }

    /// Assemble from already-built parts (tests, custom wiring).
    pub fn with_parts(store: LocalStore, queue: WriteQueue, client: ApiClient) -> Self {
        Self {
            store,
            queue,
            client,
        }
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn queue(&self) -> &WriteQueue {
        &self.queue
    }

    /// Network-first read cycle.
    pub async fn load_events(&self) -> Result<LoadOutcome> {
        match self.client.fetch_events().await {
            Ok(mut events) => {
                event::sort_for_display(&mut events);

                // Best effort: a failed local save must not take down an
                // already-successful fetch.
                let status = match self.persist_fetched(&events).await {
                    Ok(at) => StatusCondition::Saved { at },
                    Err(err) => {
                        warn!(error = %err, "fetched events could not be saved locally");
                        StatusCondition::SaveFailed
                    }
                };

                Ok(LoadOutcome { events, status })
            }
            Err(err) => {
                debug!(error = %err, "network fetch failed, falling back to local store");

                let mut events = self.store.get_all_events().await?;
                if events.is_empty() {
                    return Ok(LoadOutcome {
                        events,
                        status: StatusCondition::NoData,
                    });
                }

                event::sort_for_display(&mut events);
                let last_updated = self.store.get_last_updated().await?;
                Ok(LoadOutcome {
                    events,
                    status: StatusCondition::Offline { last_updated },
                })
            }
        }
    }

    /// Save a fresh network result and advance the sync timestamp.
    /// `last_updated` only moves when the save itself succeeded.
    async fn persist_fetched(&self, events: &[Event]) -> Result<DateTime<Utc>> {
        self.store.save_events(events).await?;
        let now = Utc::now();
        self.store.set_last_updated(now).await?;
        Ok(now)
    }

    /// Optimistic write cycle.
    ///
    /// The returned event is for immediate display regardless of what
    /// the network or the store did. A write that fails to reach the
    /// server is enqueued for replay, never dropped; only a failure of
    /// the queue storage itself propagates as an error.
    pub async fn submit_event(&self, draft: EventDraft) -> Result<SubmitOutcome> {
        let event = draft.into_event(Utc::now().timestamp_millis());

        let persisted = match self.store.save_events(std::slice::from_ref(&event)).await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, id = event.id, "optimistic local save failed");
                false
            }
        };

        let delivery = match self.client.post_event(&event).await {
            Ok(()) => Delivery::Sent,
            Err(err) => {
                debug!(error = %err, id = event.id, "event write deferred for replay");
                let write = self.client.pending_write_for(&event)?;
                self.queue.enqueue(&write).await?;
                Delivery::Deferred
            }
        };

        Ok(SubmitOutcome {
            event,
            persisted,
            delivery,
        })
    }
}

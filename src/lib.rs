//! # dashboardr
//!
//! Offline-first client core for an event dashboard. The foreground shell
//! (whatever renders the cards and wires the buttons) stays thin: it hands
//! user input to this crate and gets plain data plus a status condition
//! back. Everything resilient lives here.
//!
//! # Module Structure
//!
//! - **`local_db`** - Durable local store: an `events` table plus a
//!   `sync_meta` scalar with the last successful sync time, over SQLite.
//! - **`offline`** - Deferred write queue: a durable FIFO of pending HTTP
//!   writes and the replay worker that drains it when connectivity returns.
//! - **`sync`** - The orchestrator: network-first reads that fall back to
//!   the local store, and optimistic writes that are enqueued for replay
//!   when the network is unreachable.
//! - **`api_client`** - Thin reqwest wrapper for the two server endpoints.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dashboardr::{Config, EventDraft, SyncOrchestrator};
//!
//! # async fn example() -> dashboardr::Result<()> {
//! let orchestrator = SyncOrchestrator::open(&Config::default()).await?;
//!
//! // Network-first read; status tells the shell what banner to show.
//! let outcome = orchestrator.load_events().await?;
//! for event in &outcome.events {
//!     println!("{} ({})", event.title, event.city);
//! }
//!
//! // Optimistic write; delivery tells us whether it was deferred.
//! let draft = EventDraft {
//!     title: "RustConf".into(),
//!     date: "2026-09-01".into(),
//!     city: "Montreal".into(),
//!     note: "bring stickers".into(),
//! };
//! let submitted = orchestrator.submit_event(draft).await?;
//! println!("visible immediately: {}", submitted.event.title);
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! All operations are async tasks on the caller's runtime; nothing here
//! spawns except the caller-driven [`ReplayWorker::run`] loop, which is
//! meant to live on its own task. The replay context shares no in-memory
//! state with the orchestrator: both sides coordinate exclusively through
//! the durable queue file.

/// Configuration: server URL, data directory, replay limits.
pub mod config;

/// Crate error type and `Result` alias.
pub mod error;

/// Event data model shared with the server.
pub mod event;

/// HTTP client for the dashboard API.
pub mod api_client;

/// Durable local store (events + sync metadata).
pub mod local_db;

/// Deferred write queue and replay worker.
pub mod offline;

/// Network-first sync orchestration.
pub mod sync;

pub use api_client::ApiClient;
pub use config::Config;
pub use error::{Error, Result};
pub use event::{Event, EventDraft};
pub use local_db::LocalStore;
pub use offline::queue::{PendingWrite, QueuedWrite, WriteQueue};
pub use offline::replay::{DrainNotifier, DrainOutcome, LogNotifier, ReplayWorker};
pub use sync::{Delivery, LoadOutcome, StatusCondition, SubmitOutcome, SyncOrchestrator};

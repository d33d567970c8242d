//! # Deferred Write Queue
//!
//! Guarantees at-least-once eventual delivery of writes that could not
//! reach the network at submission time, without blocking the foreground.
//!
//! ## Architecture
//!
//! - `queue.rs` holds the durable FIFO itself: a SQLite table of
//!   serialized HTTP requests, appended by the orchestrator and consumed
//!   only after a confirmed replay.
//! - `replay.rs` holds the worker that drains the queue. It runs on its
//!   own task (the background execution context), wakes on a
//!   connectivity-restored signal rather than foreground polling, and
//!   reports a fully successful drain through a [`DrainNotifier`].
//!
//! The queue database is a file of its own, and the replay worker opens
//! its own pool over it. The two execution contexts share durable state
//! only, never memory.

pub mod queue;
pub mod replay;

pub use queue::{PendingWrite, QueuedWrite, WriteQueue};
pub use replay::{DrainNotifier, DrainOutcome, LogNotifier, ReplayWorker};

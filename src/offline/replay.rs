//! Autonomous queue replay.
//!
//! The worker lives on its own task and wakes when the connectivity
//! watch flips to online; the foreground never polls it. Each drain
//! cycle replays writes strictly in FIFO order, one at a time. A failure
//! keeps the entry at the head and halts the cycle so ordering survives
//! the outage, unless the entry has run out of attempts, in which case it
//! is parked in the dead-letter table and the drain moves on.
//!
//! Replay failures are never surfaced to the foreground. The only
//! observable side effect is the [`DrainNotifier`] call after a fully
//! successful drain of a non-empty queue.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api_client::ApiClient;
use crate::error::Result;
use crate::offline::queue::WriteQueue;

/// The background runtime's user-visible notification primitive, invoked
/// exactly once per fully drained queue.
pub trait DrainNotifier: Send + Sync {
    fn notify_drained(&self, replayed: usize);
}

/// Default notifier: a log line.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl DrainNotifier for LogNotifier {
    fn notify_drained(&self, replayed: usize) {
        info!(replayed, "deferred write queue fully drained");
    }
}

/// Outcome of one drain cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DrainOutcome {
    /// Writes confirmed by the server and removed.
    pub replayed: usize,
    /// Writes parked to the dead-letter table this cycle.
    pub parked: usize,
    /// Whether the cycle stopped early on a failed head entry.
    pub halted: bool,
}

/// Drains the deferred write queue when connectivity returns.
pub struct ReplayWorker {
    queue: WriteQueue,
    client: ApiClient,
    notifier: Arc<dyn DrainNotifier>,
    max_attempts: u32,
}

impl ReplayWorker {
    pub fn new(
        queue: WriteQueue,
        client: ApiClient,
        notifier: Arc<dyn DrainNotifier>,
        max_attempts: u32,
    ) -> Self {
        Self {
            queue,
            client,
            notifier,
            max_attempts,
        }
    }

    /// Run until the connectivity sender is dropped. Intended to be
    /// spawned on its own task:
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use dashboardr::{ApiClient, Config, LogNotifier, ReplayWorker, WriteQueue};
    /// # async fn example() -> dashboardr::Result<()> {
    /// let config = Config::default();
    /// let worker = ReplayWorker::new(
    ///     WriteQueue::open(&config.queue_db_path()).await?,
    ///     ApiClient::new(config.clone())?,
    ///     Arc::new(LogNotifier),
    ///     config.max_replay_attempts(),
    /// );
    /// let (online_tx, online_rx) = tokio::sync::watch::channel(false);
    /// tokio::spawn(worker.run(online_rx));
    /// // ... later, from whatever watches connectivity:
    /// let _ = online_tx.send(true);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(self, mut online: watch::Receiver<bool>) {
        if *online.borrow_and_update() {
            self.drain_and_log().await;
        }
        while online.changed().await.is_ok() {
            if *online.borrow_and_update() {
                self.drain_and_log().await;
            }
        }
        debug!("connectivity channel closed, replay worker stopping");
    }

    async fn drain_and_log(&self) {
        match self.drain_once().await {
            Ok(outcome) => {
                debug!(
                    replayed = outcome.replayed,
                    parked = outcome.parked,
                    halted = outcome.halted,
                    "drain cycle finished"
                );
            }
            // Queue storage itself failed; nothing to do but wait for the
            // next connectivity signal.
            Err(err) => warn!(error = %err, "drain cycle aborted"),
        }
    }

    /// Replay queued writes until the queue is empty or a head entry
    /// fails with attempts to spare.
    pub async fn drain_once(&self) -> Result<DrainOutcome> {
        let mut outcome = DrainOutcome::default();

        loop {
            let Some(entry) = self.queue.front().await? else {
                break;
            };

            match self.client.send(&entry.write).await {
                Ok(()) => {
                    self.queue.remove(entry.write.id).await?;
                    outcome.replayed += 1;
                    debug!(url = %entry.write.url, "replayed deferred write");
                }
                Err(err) => {
                    self.queue
                        .record_failure(entry.write.id, &err.to_string())
                        .await?;

                    if entry.attempts + 1 >= self.max_attempts {
                        warn!(
                            url = %entry.write.url,
                            attempts = entry.attempts + 1,
                            error = %err,
                            "deferred write exhausted its attempts, parking"
                        );
                        self.queue.park(entry.write.id).await?;
                        outcome.parked += 1;
                        continue;
                    }

                    // Head stays put; everything behind it waits for the
                    // next cycle so ordering is preserved.
                    debug!(url = %entry.write.url, error = %err, "replay failed, halting cycle");
                    outcome.halted = true;
                    break;
                }
            }
        }

        if !outcome.halted && outcome.replayed > 0 {
            self.notifier.notify_drained(outcome.replayed);
        }

        Ok(outcome)
    }
}

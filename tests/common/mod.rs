//! Common test utilities and helpers
//!
//! Shared fixtures for the integration suite: config builders pointed at
//! mock servers, sample data, and a counting drain notifier.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dashboardr::{Config, DrainNotifier, Event, EventDraft, SyncOrchestrator};
use tempfile::TempDir;

/// Config pointed at `server_url` with its databases inside `dir`.
pub fn test_config(server_url: &str, dir: &TempDir) -> Config {
    Config::new()
        .with_server_url(server_url)
        .with_data_dir(dir.path())
        .with_request_timeout(Duration::from_secs(2))
}

pub async fn orchestrator(config: &Config) -> SyncOrchestrator {
    SyncOrchestrator::open(config)
        .await
        .expect("failed to open orchestrator")
}

pub fn sample_event(id: i64, title: &str) -> Event {
    Event {
        id,
        title: title.to_string(),
        date: "2026-09-15".to_string(),
        city: "Amsterdam".to_string(),
        note: "bring a laptop".to_string(),
    }
}

pub fn draft(title: &str) -> EventDraft {
    EventDraft {
        title: title.to_string(),
        date: "2026-10-01".to_string(),
        city: "Utrecht".to_string(),
        note: String::new(),
    }
}

/// Drain notifier that counts invocations.
#[derive(Debug, Default)]
pub struct CountingNotifier {
    count: AtomicUsize,
}

impl CountingNotifier {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl DrainNotifier for CountingNotifier {
    fn notify_drained(&self, _replayed: usize) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Poll until `notifier` has fired at least once or the timeout elapses.
pub async fn wait_for_notification(notifier: &CountingNotifier, timeout: Duration) {
    tokio::time::timeout(timeout, async {
        while notifier.count() == 0 {
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
    })
    .await
    .expect("drain notification did not fire in time");
}

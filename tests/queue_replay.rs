//! Replay ordering and dead-letter behavior of the deferred write queue.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dashboardr::{ApiClient, Config, PendingWrite, ReplayWorker, WriteQueue};

use common::CountingNotifier;

fn write_to(server: &MockServer, endpoint: &str) -> PendingWrite {
    PendingWrite::new("POST", format!("{}{}", server.uri(), endpoint), vec![], "{}")
}

fn worker_for(
    server: &MockServer,
    queue: WriteQueue,
    notifier: Arc<CountingNotifier>,
    max_attempts: u32,
) -> ReplayWorker {
    let client = ApiClient::new(Config::new().with_server_url(server.uri())).unwrap();
    ReplayWorker::new(queue, client, notifier, max_attempts)
}

async fn mount_status(server: &MockServer, endpoint: &str, status: u16, expected: Option<u64>) {
    let mock = Mock::given(method("POST"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(status));
    let mock = match expected {
        Some(n) => mock.expect(n),
        None => mock,
    };
    mock.mount(server).await;
}

/// W1, W2, W3 in order; W2 failing keeps W3 untouched for the cycle, and
/// the next cycle resumes from W2.
#[tokio::test]
async fn test_failed_head_halts_cycle_and_preserves_order() {
    let server = MockServer::start().await;
    mount_status(&server, "/w1", 200, Some(1)).await;
    mount_status(&server, "/w2", 500, None).await;
    mount_status(&server, "/w3", 200, Some(0)).await;

    let queue = WriteQueue::open_in_memory().await.unwrap();
    let (w1, w2, w3) = (
        write_to(&server, "/w1"),
        write_to(&server, "/w2"),
        write_to(&server, "/w3"),
    );
    queue.enqueue(&w1).await.unwrap();
    queue.enqueue(&w2).await.unwrap();
    queue.enqueue(&w3).await.unwrap();

    let notifier = Arc::new(CountingNotifier::default());
    let worker = worker_for(&server, queue.clone(), notifier.clone(), 5);

    let outcome = worker.drain_once().await.unwrap();
    assert_eq!(outcome.replayed, 1);
    assert!(outcome.halted);
    assert_eq!(outcome.parked, 0);

    // W2 stays at the head; W3 was never attempted (mock expectations
    // verify that on scope exit).
    assert_eq!(queue.len().await.unwrap(), 2);
    assert_eq!(queue.front().await.unwrap().unwrap().write.id, w2.id);
    // A halted cycle is not a drain; no notification.
    assert_eq!(notifier.count(), 0);
    server.verify().await;

    // Server heals; the next cycle resumes from W2 and finishes the job.
    server.reset().await;
    mount_status(&server, "/w2", 200, Some(1)).await;
    mount_status(&server, "/w3", 200, Some(1)).await;

    let outcome = worker.drain_once().await.unwrap();
    assert_eq!(outcome.replayed, 2);
    assert!(!outcome.halted);
    assert!(queue.is_empty().await.unwrap());
    assert_eq!(notifier.count(), 1);
}

/// A poison write is parked after exhausting its attempts instead of
/// blocking everything queued behind it forever.
#[tokio::test]
async fn test_poison_write_is_dead_lettered_after_max_attempts() {
    let server = MockServer::start().await;
    mount_status(&server, "/poison", 400, None).await;
    mount_status(&server, "/healthy", 200, Some(1)).await;

    let queue = WriteQueue::open_in_memory().await.unwrap();
    let poison = write_to(&server, "/poison");
    let healthy = write_to(&server, "/healthy");
    queue.enqueue(&poison).await.unwrap();
    queue.enqueue(&healthy).await.unwrap();

    let notifier = Arc::new(CountingNotifier::default());
    let worker = worker_for(&server, queue.clone(), notifier.clone(), 2);

    // First cycle: poison fails with an attempt to spare, so it halts.
    let outcome = worker.drain_once().await.unwrap();
    assert_eq!(outcome, dashboardr::DrainOutcome {
        replayed: 0,
        parked: 0,
        halted: true,
    });
    assert_eq!(queue.front().await.unwrap().unwrap().attempts, 1);

    // Second cycle: poison hits max attempts, gets parked, and the
    // healthy write behind it finally goes out.
    let outcome = worker.drain_once().await.unwrap();
    assert_eq!(outcome.parked, 1);
    assert_eq!(outcome.replayed, 1);
    assert!(!outcome.halted);

    assert!(queue.is_empty().await.unwrap());
    assert_eq!(queue.dead_letter_count().await.unwrap(), 1);
    assert_eq!(notifier.count(), 1);
}

#[tokio::test]
async fn test_draining_empty_queue_does_not_notify() {
    let server = MockServer::start().await;
    let queue = WriteQueue::open_in_memory().await.unwrap();
    let notifier = Arc::new(CountingNotifier::default());
    let worker = worker_for(&server, queue, notifier.clone(), 5);

    let outcome = worker.drain_once().await.unwrap();

    assert_eq!(outcome.replayed, 0);
    assert!(!outcome.halted);
    assert_eq!(notifier.count(), 0);
}

/// Replay must confirm before removing: a write that keeps failing is
/// still in the queue after the cycle.
#[tokio::test]
async fn test_failed_write_is_never_discarded() {
    let server = MockServer::start().await;
    mount_status(&server, "/w", 503, None).await;

    let queue = WriteQueue::open_in_memory().await.unwrap();
    let w = write_to(&server, "/w");
    queue.enqueue(&w).await.unwrap();

    let notifier = Arc::new(CountingNotifier::default());
    let worker = worker_for(&server, queue.clone(), notifier, 5);
    worker.drain_once().await.unwrap();

    let stored = queue.front().await.unwrap().unwrap();
    assert_eq!(stored.write.id, w.id);
    assert_eq!(stored.attempts, 1);
    assert!(stored.last_error.unwrap().contains("503"));
}

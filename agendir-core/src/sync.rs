//! Background drain of the outbox toward the remote store.
//!
//! The drainer replays pending mutations in FIFO order whenever connectivity
//! allows. Items are removed only on a confirmed remote apply; a failure
//! stalls the rest of the run so nothing is ever applied out of order.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::connectivity::ConnectivityMonitor;
use crate::error::AgendirResult;
use crate::outbox::{OutboxItem, OutboxQueue};

/// Failure signal from the remote-apply contract.
#[derive(Error, Debug, Clone)]
pub enum SyncFailure {
    /// Network-ish trouble: the item stays queued and retries next drain.
    #[error("transient sync failure: {0}")]
    Transient(String),
    /// The remote rejected the payload; retrying will never succeed.
    #[error("permanent sync failure: {0}")]
    Permanent(String),
}

/// Applies a single outbox item to the remote store.
///
/// Assumed network-bound and potentially slow; the drainer treats it as
/// opaque and never force-aborts an in-flight call.
pub trait RemoteApply: Send + Sync {
    fn apply(
        &self,
        item: &OutboxItem,
    ) -> impl Future<Output = Result<(), SyncFailure>> + Send;
}

/// How a drain pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Reached the end of the snapshot.
    Drained,
    /// A remote apply failed; remaining items wait for the next pass.
    Stalled,
    /// Connectivity dropped mid-pass; remaining items were skipped quietly.
    Paused,
    /// We were offline before the pass started.
    Offline,
    /// Another drain pass was already running; nothing was done.
    AlreadyRunning,
}

/// Summary of one drain pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    pub applied: usize,
    pub dead_lettered: usize,
    pub outcome: DrainOutcome,
}

impl DrainReport {
    fn finished(applied: usize, dead_lettered: usize, outcome: DrainOutcome) -> Self {
        DrainReport {
            applied,
            dead_lettered,
            outcome,
        }
    }

    fn skipped(outcome: DrainOutcome) -> Self {
        DrainReport {
            applied: 0,
            dead_lettered: 0,
            outcome,
        }
    }
}

/// Drains the outbox against a remote store.
///
/// `drain` is single-flight: a second invocation while one is running
/// returns immediately with [`DrainOutcome::AlreadyRunning`]. The drainer
/// holds no state of its own between items beyond that flag.
pub struct SyncDrainer<R: RemoteApply> {
    queue: Arc<OutboxQueue>,
    remote: R,
    connectivity: Arc<ConnectivityMonitor>,
    draining: AtomicBool,
    nudge: Notify,
    /// Items older than this are dead-lettered instead of retried.
    max_item_age: Option<chrono::Duration>,
}

/// Clears the single-flight flag on every exit path.
struct DrainGuard<'a>(&'a AtomicBool);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<R: RemoteApply> SyncDrainer<R> {
    pub fn new(queue: Arc<OutboxQueue>, remote: R, connectivity: Arc<ConnectivityMonitor>) -> Self {
        SyncDrainer {
            queue,
            remote,
            connectivity,
            draining: AtomicBool::new(false),
            nudge: Notify::new(),
            max_item_age: None,
        }
    }

    /// Retry items forever until they exceed `max_age`, then move them to
    /// the dead-letter list so the user can deal with them.
    pub fn with_max_item_age(mut self, max_age: chrono::Duration) -> Self {
        self.max_item_age = Some(max_age);
        self
    }

    /// Ask the background loop (see [`SyncDrainer::run`]) for a drain pass.
    /// Cheap and safe to call from the mutation path.
    pub fn request_drain(&self) {
        self.nudge.notify_one();
    }

    /// Run one drain pass.
    ///
    /// Never returns an error for remote failures; those are reflected in
    /// the report and the items stay queued. Only storage trouble while
    /// updating the queue propagates.
    pub async fn drain(&self) -> AgendirResult<DrainReport> {
        if self.draining.swap(true, Ordering::SeqCst) {
            debug!("drain already in progress, skipping");
            return Ok(DrainReport::skipped(DrainOutcome::AlreadyRunning));
        }
        let _guard = DrainGuard(&self.draining);

        if !self.connectivity.is_online() {
            return Ok(DrainReport::skipped(DrainOutcome::Offline));
        }

        let snapshot = self.queue.peek_all();
        let mut applied = 0;
        let mut dead_lettered = 0;

        for item in &snapshot {
            // Connectivity is re-checked before every item; a mid-pass drop
            // pauses the rest without touching them.
            if !self.connectivity.is_online() {
                info!(applied, remaining = snapshot.len() - applied, "drain paused: offline");
                return Ok(DrainReport::finished(applied, dead_lettered, DrainOutcome::Paused));
            }

            if let Some(max_age) = self.max_item_age
                && item.age(Utc::now()) > max_age
            {
                if self.queue.dead_letter(&item.id, "exceeded retry age")? {
                    dead_lettered += 1;
                }
                continue;
            }

            match self.remote.apply(item).await {
                Ok(()) => {
                    self.queue.remove(&item.id)?;
                    applied += 1;
                    debug!(entity_id = %item.entity_id, operation = item.operation.label(), "outbox item applied");
                }
                Err(SyncFailure::Transient(msg)) => {
                    warn!(entity_id = %item.entity_id, %msg, "transient sync failure, will retry");
                    return Ok(DrainReport::finished(applied, dead_lettered, DrainOutcome::Stalled));
                }
                Err(SyncFailure::Permanent(msg)) => {
                    // Out of the retry path, but still stop the pass: items
                    // behind it were enqueued assuming it went first.
                    if self.queue.dead_letter(&item.id, &msg)? {
                        dead_lettered += 1;
                    }
                    return Ok(DrainReport::finished(applied, dead_lettered, DrainOutcome::Stalled));
                }
            }
        }

        if applied > 0 {
            info!(applied, "drain complete");
        }
        Ok(DrainReport::finished(applied, dead_lettered, DrainOutcome::Drained))
    }

    /// Background loop: drains on enqueue nudges while online and on every
    /// offline→online transition. Runs until the task is dropped.
    pub async fn run(self: Arc<Self>) {
        let mut online_rx = self.connectivity.subscribe();
        let mut was_online = *online_rx.borrow_and_update();
        loop {
            tokio::select! {
                _ = self.nudge.notified() => {
                    if self.connectivity.is_online()
                        && let Err(e) = self.drain().await
                    {
                        warn!(error = %e, "drain failed");
                    }
                }
                changed = online_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let online = *online_rx.borrow_and_update();
                    if online && !was_online {
                        info!("back online, draining outbox");
                        if let Err(e) = self.drain().await {
                            warn!(error = %e, "drain failed");
                        }
                    }
                    was_online = online;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityKind, Operation};
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory remote that records applies and can be told to fail.
    #[derive(Default)]
    struct FakeRemote {
        applied: Mutex<Vec<(String, Operation)>>,
        fail_transient: Mutex<HashSet<String>>,
        fail_permanent: Mutex<HashSet<String>>,
        delay: Option<Duration>,
        /// Simulates losing the connection right after the first apply.
        knock_offline: Mutex<Option<Arc<ConnectivityMonitor>>>,
    }

    impl FakeRemote {
        fn applied(&self) -> Vec<(String, Operation)> {
            self.applied.lock().unwrap().clone()
        }
    }

    impl RemoteApply for Arc<FakeRemote> {
        async fn apply(&self, item: &OutboxItem) -> Result<(), SyncFailure> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_transient.lock().unwrap().contains(&item.entity_id) {
                return Err(SyncFailure::Transient("remote unavailable".into()));
            }
            if self.fail_permanent.lock().unwrap().contains(&item.entity_id) {
                return Err(SyncFailure::Permanent("payload rejected".into()));
            }
            self.applied
                .lock()
                .unwrap()
                .push((item.entity_id.clone(), item.operation));
            if let Some(monitor) = self.knock_offline.lock().unwrap().take() {
                monitor.set_online(false);
            }
            Ok(())
        }
    }

    fn make_item(entity_id: &str, operation: Operation) -> OutboxItem {
        OutboxItem::new(
            entity_id,
            EntityKind::Event,
            operation,
            serde_json::json!({ "id": entity_id }),
        )
    }

    struct Harness {
        _dir: tempfile::TempDir,
        queue: Arc<OutboxQueue>,
        remote: Arc<FakeRemote>,
        monitor: Arc<ConnectivityMonitor>,
        drainer: Arc<SyncDrainer<Arc<FakeRemote>>>,
    }

    fn harness(online: bool, remote: FakeRemote) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let queue = Arc::new(OutboxQueue::open(dir.path().join("outbox.json")).unwrap());
        let remote = Arc::new(remote);
        let monitor = Arc::new(ConnectivityMonitor::new(online));
        let drainer = Arc::new(SyncDrainer::new(
            Arc::clone(&queue),
            Arc::clone(&remote),
            Arc::clone(&monitor),
        ));
        Harness {
            _dir: dir,
            queue,
            remote,
            monitor,
            drainer,
        }
    }

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn offline_create_then_delete_applies_in_order() {
        // Scenario: both mutations queued offline, replayed on reconnect.
        let h = harness(false, FakeRemote::default());
        h.queue.enqueue(make_item("5", Operation::Create)).unwrap();
        h.queue.enqueue(make_item("5", Operation::Delete)).unwrap();

        let report = h.drainer.drain().await.unwrap();
        assert_eq!(report.outcome, DrainOutcome::Offline);
        assert!(h.remote.applied().is_empty());

        h.monitor.set_online(true);
        let report = h.drainer.drain().await.unwrap();
        assert_eq!(report.outcome, DrainOutcome::Drained);
        assert_eq!(report.applied, 2);
        assert_eq!(
            h.remote.applied(),
            vec![
                ("5".to_string(), Operation::Create),
                ("5".to_string(), Operation::Delete),
            ]
        );
        assert!(h.queue.is_empty());
    }

    #[tokio::test]
    async fn transient_failure_stalls_without_reordering() {
        // Scenario: item 2 of 3 fails; 1 is removed, 2 and 3 stay in order.
        let remote = FakeRemote::default();
        remote.fail_transient.lock().unwrap().insert("e2".to_string());
        let h = harness(true, remote);
        h.queue.enqueue(make_item("e1", Operation::Create)).unwrap();
        h.queue.enqueue(make_item("e2", Operation::Create)).unwrap();
        h.queue.enqueue(make_item("e3", Operation::Create)).unwrap();

        let report = h.drainer.drain().await.unwrap();
        assert_eq!(report.outcome, DrainOutcome::Stalled);
        assert_eq!(report.applied, 1);
        let remaining: Vec<_> = h
            .queue
            .peek_all()
            .iter()
            .map(|i| i.entity_id.clone())
            .collect();
        assert_eq!(remaining, vec!["e2", "e3"]);

        // Failure clears; the next pass finishes in order.
        h.remote.fail_transient.lock().unwrap().clear();
        let report = h.drainer.drain().await.unwrap();
        assert_eq!(report.outcome, DrainOutcome::Drained);
        let applied: Vec<_> = h.remote.applied().iter().map(|(id, _)| id.clone()).collect();
        assert_eq!(applied, vec!["e1", "e2", "e3"]);
        assert!(h.queue.is_empty());
    }

    #[tokio::test]
    async fn permanent_failure_dead_letters_and_stalls() {
        let remote = FakeRemote::default();
        remote.fail_permanent.lock().unwrap().insert("bad".to_string());
        let h = harness(true, remote);
        h.queue.enqueue(make_item("bad", Operation::Create)).unwrap();
        h.queue.enqueue(make_item("ok", Operation::Create)).unwrap();

        let report = h.drainer.drain().await.unwrap();
        assert_eq!(report.outcome, DrainOutcome::Stalled);
        assert_eq!(report.dead_lettered, 1);
        assert_eq!(h.queue.dead_items().len(), 1);
        // The bad item is out of the retry path; the next pass succeeds.
        let report = h.drainer.drain().await.unwrap();
        assert_eq!(report.applied, 1);
        assert_eq!(report.outcome, DrainOutcome::Drained);
        assert!(h.queue.is_empty());
    }

    #[tokio::test]
    async fn mid_drain_disconnect_pauses_remaining_items() {
        let remote = FakeRemote::default();
        let h = harness(true, remote);
        *h.remote.knock_offline.lock().unwrap() = Some(Arc::clone(&h.monitor));
        h.queue.enqueue(make_item("e1", Operation::Create)).unwrap();
        h.queue.enqueue(make_item("e2", Operation::Create)).unwrap();
        h.queue.enqueue(make_item("e3", Operation::Create)).unwrap();

        let report = h.drainer.drain().await.unwrap();
        assert_eq!(report.outcome, DrainOutcome::Paused);
        assert_eq!(report.applied, 1);
        assert_eq!(h.queue.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_drain_is_single_flight() {
        let remote = FakeRemote {
            delay: Some(Duration::from_secs(1)),
            ..FakeRemote::default()
        };
        let h = harness(true, remote);
        h.queue.enqueue(make_item("e1", Operation::Create)).unwrap();

        let drainer = Arc::clone(&h.drainer);
        let first = tokio::spawn(async move { drainer.drain().await.unwrap() });
        settle().await;

        // The first pass is parked inside the remote apply.
        let second = h.drainer.drain().await.unwrap();
        assert_eq!(second.outcome, DrainOutcome::AlreadyRunning);

        tokio::time::advance(Duration::from_secs(2)).await;
        let first = first.await.unwrap();
        assert_eq!(first.outcome, DrainOutcome::Drained);
        assert_eq!(h.remote.applied().len(), 1);
        assert!(h.queue.is_empty());
    }

    #[tokio::test]
    async fn expired_items_move_to_dead_letter() {
        let h = harness(true, FakeRemote::default());
        let drainer = Arc::new(
            SyncDrainer::new(
                Arc::clone(&h.queue),
                Arc::clone(&h.remote),
                Arc::clone(&h.monitor),
            )
            .with_max_item_age(chrono::Duration::days(14)),
        );

        let mut stale = make_item("old", Operation::Update);
        stale.enqueued_at = Utc::now() - chrono::Duration::days(30);
        h.queue.enqueue(stale).unwrap();
        h.queue.enqueue(make_item("fresh", Operation::Create)).unwrap();

        let report = drainer.drain().await.unwrap();
        assert_eq!(report.outcome, DrainOutcome::Drained);
        assert_eq!(report.dead_lettered, 1);
        assert_eq!(report.applied, 1);
        assert_eq!(h.queue.dead_items()[0].item.entity_id, "old");
    }

    #[tokio::test]
    async fn run_loop_drains_on_reconnect() {
        let h = harness(false, FakeRemote::default());
        h.queue.enqueue(make_item("e1", Operation::Create)).unwrap();
        let loop_task = tokio::spawn(Arc::clone(&h.drainer).run());

        settle().await;
        assert!(h.remote.applied().is_empty());

        h.monitor.set_online(true);
        settle().await;
        assert_eq!(h.remote.applied().len(), 1);
        assert!(h.queue.is_empty());
        loop_task.abort();
    }

    #[tokio::test]
    async fn run_loop_drains_on_nudge_while_online() {
        let h = harness(true, FakeRemote::default());
        let loop_task = tokio::spawn(Arc::clone(&h.drainer).run());
        settle().await;

        h.queue.enqueue(make_item("e1", Operation::Create)).unwrap();
        h.drainer.request_drain();
        settle().await;

        assert_eq!(h.remote.applied().len(), 1);
        loop_task.abort();
    }
}

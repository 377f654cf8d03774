//! Reminder timers for upcoming events and activities.
//!
//! One live timer per `(entity, kind)` key. Scheduling for a key that is
//! already armed cancels the old timer first; a timer that fires cleans up
//! its own bookkeeping. Nothing here is persisted: timers are re-derived
//! from entity data after a restart.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::entity::EntityKind;

/// Dispatches a user-visible alert. Fire-and-forget; platform fallbacks are
/// the implementation's concern, not the scheduler's.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, title: &str, body: &str);
}

/// Identity of a reminder: one per entity, regardless of how many times its
/// record has been edited.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationKey {
    pub entity_id: String,
    pub kind: EntityKind,
}

impl NotificationKey {
    pub fn new(entity_id: impl Into<String>, kind: EntityKind) -> Self {
        NotificationKey {
            entity_id: entity_id.into(),
            kind,
        }
    }
}

struct ArmedTimer {
    /// Distinguishes this timer from any later one armed under the same key,
    /// so a firing timer never removes a successor's bookkeeping.
    generation: u64,
    fire_at: DateTime<Utc>,
    handle: JoinHandle<()>,
}

/// Arms one-shot reminder timers and keeps exactly one per key.
///
/// Requires a running Tokio runtime; timers are plain `tokio::time::sleep`
/// tasks and share no locks with the sync drainer.
pub struct NotificationScheduler<N: Notifier> {
    notifier: Arc<N>,
    timers: Arc<Mutex<HashMap<NotificationKey, ArmedTimer>>>,
    generation: AtomicU64,
}

impl<N: Notifier> NotificationScheduler<N> {
    pub fn new(notifier: N) -> Self {
        NotificationScheduler {
            notifier: Arc::new(notifier),
            timers: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    /// Arm a timer for `key` firing at `fire_at`.
    ///
    /// A `fire_at` that is not strictly in the future is a silent no-op —
    /// except that any existing timer for the key is dropped, since its
    /// trigger has moved into the past and must never fire.
    pub fn schedule(&self, key: NotificationKey, fire_at: DateTime<Utc>, title: String, body: String) {
        let now = Utc::now();
        if fire_at <= now {
            let mut timers = self.lock();
            if let Some(old) = timers.remove(&key) {
                old.handle.abort();
            }
            debug!(entity_id = %key.entity_id, %fire_at, "reminder in the past, skipped");
            return;
        }
        let Ok(delay) = (fire_at - now).to_std() else {
            return;
        };

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        // Lock held across spawn+insert: if the timer fires instantly it
        // blocks on this lock before touching the map, so the entry it sees
        // is always its own.
        let mut timers = self.lock();
        let notifier = Arc::clone(&self.notifier);
        let timers_ref = Arc::clone(&self.timers);
        let task_key = key.clone();
        // Created here, not inside the task, so the deadline is anchored to
        // the moment of scheduling rather than the task's first poll.
        let sleep = tokio::time::sleep(delay);
        let handle = tokio::spawn(async move {
            sleep.await;
            notifier.notify(&title, &body);
            let mut timers = timers_ref.lock().unwrap_or_else(PoisonError::into_inner);
            if timers
                .get(&task_key)
                .is_some_and(|t| t.generation == generation)
            {
                timers.remove(&task_key);
            }
        });
        if let Some(old) = timers.insert(
            key,
            ArmedTimer {
                generation,
                fire_at,
                handle,
            },
        ) {
            old.handle.abort();
        }
    }

    /// Cancel the timer for `key`, if any. Cancelling an absent key is a
    /// no-op by design.
    pub fn cancel(&self, key: &NotificationKey) {
        if let Some(timer) = self.lock().remove(key) {
            timer.handle.abort();
            debug!(entity_id = %key.entity_id, "reminder cancelled");
        }
    }

    /// Cancel every live timer (sign-out / reset path).
    pub fn cancel_all(&self) {
        let mut timers = self.lock();
        for (_, timer) in timers.drain() {
            timer.handle.abort();
        }
    }

    /// Replace the timer for `key` after an entity mutation.
    ///
    /// If the old timer fires in the narrow window before replacement, the
    /// alert is allowed to surface; the bookkeeping still ends up holding
    /// exactly the new entry.
    pub fn reschedule_on_mutation(
        &self,
        key: NotificationKey,
        fire_at: DateTime<Utc>,
        title: String,
        body: String,
    ) {
        self.schedule(key, fire_at, title, body);
    }

    /// When the timer for `key` would fire, if one is armed.
    pub fn armed_fire_at(&self, key: &NotificationKey) -> Option<DateTime<Utc>> {
        self.lock().get(key).map(|t| t.fire_at)
    }

    pub fn armed_count(&self) -> usize {
        self.lock().len()
    }

    #[cfg(test)]
    pub(crate) fn armed_generation(&self, key: &NotificationKey) -> Option<u64> {
        self.lock().get(key).map(|t| t.generation)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<NotificationKey, ArmedTimer>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<N: Notifier> Drop for NotificationScheduler<N> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

//! Durable outbox queue of pending mutations.
//!
//! Every local mutation is appended here before anything else happens; the
//! queue is the source of truth for "not yet on the server". Items are
//! persisted as a single ordered JSON document and survive process restarts.
//! They leave the queue only after a confirmed remote apply, or by moving to
//! the dead-letter list once retrying stops making sense.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::entity::{EntityKind, Operation};
use crate::error::{AgendirError, AgendirResult};

/// A pending mutation awaiting remote application.
///
/// Duplicates per entity are allowed; the drainer replays them strictly in
/// enqueue order, so a later delete wins over an earlier update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxItem {
    /// Queue-item id, distinct from the entity id.
    pub id: String,
    pub entity_id: String,
    pub entity_kind: EntityKind,
    pub operation: Operation,
    /// Opaque record snapshot taken at mutation time.
    pub payload: serde_json::Value,
    pub enqueued_at: DateTime<Utc>,
}

impl OutboxItem {
    pub fn new(
        entity_id: impl Into<String>,
        entity_kind: EntityKind,
        operation: Operation,
        payload: serde_json::Value,
    ) -> Self {
        OutboxItem {
            id: Uuid::new_v4().to_string(),
            entity_id: entity_id.into(),
            entity_kind,
            operation,
            payload,
            enqueued_at: Utc::now(),
        }
    }

    /// How long this item has been waiting, as of `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.enqueued_at
    }
}

/// An item pulled out of the retry path, kept around so it can be surfaced
/// to the user instead of silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadItem {
    pub item: OutboxItem,
    pub reason: String,
    pub dead_since: DateTime<Utc>,
}

/// Persisted queue state, one JSON document under a single logical key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct OutboxState {
    #[serde(default = "default_state_version")]
    version: u8,
    #[serde(default)]
    items: Vec<OutboxItem>,
    #[serde(default)]
    dead: Vec<DeadItem>,
}

fn default_state_version() -> u8 {
    1
}

/// Append-only ordered log of pending mutations, durable across restarts.
///
/// The append+persist step runs under one scoped lock so concurrent enqueues
/// cannot interleave; the lock is never held across an await point.
pub struct OutboxQueue {
    path: PathBuf,
    state: Mutex<OutboxState>,
}

impl OutboxQueue {
    /// Open (or create) the queue persisted at `path`.
    ///
    /// A corrupt state file is logged and treated as empty rather than
    /// refusing to start.
    pub fn open(path: impl Into<PathBuf>) -> AgendirResult<Self> {
        let path = path.into();
        let state = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<OutboxState>(&raw) {
                Ok(state) => state,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt outbox state, starting empty");
                    OutboxState::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => OutboxState::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(OutboxQueue {
            path,
            state: Mutex::new(state),
        })
    }

    /// Append an item to the tail and persist it. Returns once the item is
    /// durable; on a persist failure the append is rolled back.
    pub fn enqueue(&self, item: OutboxItem) -> AgendirResult<()> {
        let mut state = self.lock();
        state.items.push(item);
        if let Err(e) = persist(&self.path, &state) {
            state.items.pop();
            return Err(e);
        }
        debug!(pending = state.items.len(), "enqueued outbox item");
        Ok(())
    }

    /// Ordered snapshot of all pending items; does not remove anything.
    pub fn peek_all(&self) -> Vec<OutboxItem> {
        self.lock().items.clone()
    }

    /// Remove an item after confirmed remote application.
    ///
    /// Removing an id that is no longer queued is a no-op, not an error.
    pub fn remove(&self, item_id: &str) -> AgendirResult<()> {
        let mut state = self.lock();
        let before = state.items.len();
        state.items.retain(|i| i.id != item_id);
        if state.items.len() == before {
            debug!(item_id, "outbox item already removed");
            return Ok(());
        }
        persist(&self.path, &state)
    }

    /// Move an item from the retry path to the dead-letter list.
    ///
    /// Returns `false` (a no-op) if the item is no longer pending.
    pub fn dead_letter(&self, item_id: &str, reason: &str) -> AgendirResult<bool> {
        let mut state = self.lock();
        let Some(pos) = state.items.iter().position(|i| i.id == item_id) else {
            return Ok(false);
        };
        let item = state.items.remove(pos);
        warn!(item_id, entity_id = %item.entity_id, reason, "outbox item dead-lettered");
        state.dead.push(DeadItem {
            item,
            reason: reason.to_string(),
            dead_since: Utc::now(),
        });
        persist(&self.path, &state)?;
        Ok(true)
    }

    /// Items that exhausted their retry policy, oldest first.
    pub fn dead_items(&self) -> Vec<DeadItem> {
        self.lock().dead.clone()
    }

    /// Drop all pending and dead items. Destructive by design (sign-out /
    /// explicit reset).
    pub fn clear(&self) -> AgendirResult<()> {
        let mut state = self.lock();
        state.items.clear();
        state.dead.clear();
        persist(&self.path, &state)
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, OutboxState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Write the state atomically: temp file in the same directory, then rename.
fn persist(path: &Path, state: &OutboxState) -> AgendirResult<()> {
    let raw = serde_json::to_string_pretty(state)
        .map_err(|e| AgendirError::Serialization(e.to_string()))?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, raw)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

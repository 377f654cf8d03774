//! Mutation fan-out: outbox enqueue plus reminder upkeep.
//!
//! The entity store calls [`Engine::on_mutation`] synchronously after every
//! create/update/delete. By the time it returns, the mutation is durable in
//! the outbox and the reminder timer for the entity reflects the new state;
//! nothing is deferred that could be lost on immediate process exit.

use std::sync::Arc;

use tracing::debug;

use crate::connectivity::ConnectivityMonitor;
use crate::entity::{Mutation, Operation};
use crate::error::AgendirResult;
use crate::notify::{NotificationKey, NotificationScheduler, Notifier};
use crate::outbox::{OutboxItem, OutboxQueue};
use crate::sync::{RemoteApply, SyncDrainer};

/// The offline-first core: observes entity mutations and keeps the outbox
/// and the reminder timers consistent with them.
pub struct Engine<R: RemoteApply, N: Notifier> {
    queue: Arc<OutboxQueue>,
    drainer: Arc<SyncDrainer<R>>,
    scheduler: NotificationScheduler<N>,
    connectivity: Arc<ConnectivityMonitor>,
}

impl<R: RemoteApply, N: Notifier> Engine<R, N> {
    pub fn new(
        queue: Arc<OutboxQueue>,
        drainer: Arc<SyncDrainer<R>>,
        scheduler: NotificationScheduler<N>,
        connectivity: Arc<ConnectivityMonitor>,
    ) -> Self {
        Engine {
            queue,
            drainer,
            scheduler,
            connectivity,
        }
    }

    /// Handle one entity mutation: enqueue it for sync, update the entity's
    /// reminder, and nudge the drainer if we are online.
    pub fn on_mutation(&self, mutation: &Mutation) -> AgendirResult<()> {
        let item = OutboxItem::new(
            mutation.entity_id.clone(),
            mutation.kind,
            mutation.operation,
            mutation.snapshot.clone(),
        );
        self.queue.enqueue(item)?;
        self.update_reminder(mutation);
        if self.connectivity.is_online() {
            self.drainer.request_drain();
        }
        Ok(())
    }

    /// Re-derive reminder timers from entity snapshots, e.g. after a restart
    /// (timers are never persisted).
    pub fn rearm_reminders<'a>(&self, mutations: impl IntoIterator<Item = &'a Mutation>) {
        for mutation in mutations {
            self.update_reminder(mutation);
        }
    }

    fn update_reminder(&self, mutation: &Mutation) {
        let key = NotificationKey::new(mutation.entity_id.clone(), mutation.kind);

        if mutation.operation == Operation::Delete || !mutation.notifications_enabled {
            self.scheduler.cancel(&key);
            return;
        }
        let Some(fire_at) = mutation.reminder_fire_at() else {
            self.scheduler.cancel(&key);
            return;
        };
        // Only rearm when the fire instant actually moved; an edit to an
        // unrelated field keeps the existing timer.
        if self.scheduler.armed_fire_at(&key) == Some(fire_at) {
            debug!(entity_id = %mutation.entity_id, "reminder unchanged, keeping timer");
            return;
        }
        self.scheduler.reschedule_on_mutation(
            key,
            fire_at,
            mutation.reminder_title(),
            mutation.reminder_body(),
        );
    }

    pub fn queue(&self) -> &Arc<OutboxQueue> {
        &self.queue
    }

    pub fn drainer(&self) -> &Arc<SyncDrainer<R>> {
        &self.drainer
    }

    pub fn scheduler(&self) -> &NotificationScheduler<N> {
        &self.scheduler
    }

    pub fn connectivity(&self) -> &Arc<ConnectivityMonitor> {
        &self.connectivity
    }
}

//! Agenda entity types and the mutation contract.
//!
//! `Event` and `Activity` are the two record kinds the entity store holds.
//! Every create/update/delete is reported to the core as a [`Mutation`],
//! which carries an opaque snapshot for the outbox plus the fields the
//! reminder scheduler needs (trigger time, lead minutes, enabled flag).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AgendirError, AgendirResult};

/// Default reminder lead time in minutes.
pub const DEFAULT_REMINDER_MINUTES: i64 = 15;

/// A personal event (meeting, appointment, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// When the event starts.
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    /// Whether a reminder should be armed for this event.
    pub notifications_enabled: bool,
    /// Minutes before `date` at which the reminder fires.
    pub reminder_minutes: i64,
}

/// A personal activity (task-like, owned by a user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    /// User the activity belongs to.
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    /// When the activity is due.
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    /// Free-form category, e.g. "work", "personal", "social".
    pub category: Option<String>,
    pub completed: bool,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Which kind of record a mutation or outbox item refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Event,
    Activity,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Event => "event",
            EntityKind::Activity => "activity",
        }
    }
}

/// The operation a mutation performed on its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn label(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// A mutation event emitted by the entity store after every create, update
/// or delete.
///
/// The core consumes this synchronously: the outbox enqueue and the reminder
/// upkeep both complete before the store's call returns.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub entity_id: String,
    pub kind: EntityKind,
    pub operation: Operation,
    /// Full record snapshot, replayed verbatim against the remote store.
    pub snapshot: serde_json::Value,
    pub title: String,
    /// When the entity starts, if it has a time at all.
    pub trigger_time: Option<DateTime<Utc>>,
    pub reminder_minutes: i64,
    pub notifications_enabled: bool,
}

impl Mutation {
    /// Build a mutation for an event record.
    pub fn event(operation: Operation, event: &Event) -> AgendirResult<Self> {
        Ok(Mutation {
            entity_id: event.id.clone(),
            kind: EntityKind::Event,
            operation,
            snapshot: to_snapshot(event)?,
            title: event.title.clone(),
            trigger_time: Some(event.date),
            reminder_minutes: event.reminder_minutes,
            notifications_enabled: event.notifications_enabled,
        })
    }

    /// Build a mutation for an activity record.
    ///
    /// Activities carry no per-record reminder settings; they use the default
    /// lead time, and completed activities do not remind.
    pub fn activity(operation: Operation, activity: &Activity) -> AgendirResult<Self> {
        Ok(Mutation {
            entity_id: activity.id.clone(),
            kind: EntityKind::Activity,
            operation,
            snapshot: to_snapshot(activity)?,
            title: activity.title.clone(),
            trigger_time: Some(activity.date),
            reminder_minutes: DEFAULT_REMINDER_MINUTES,
            notifications_enabled: !activity.completed,
        })
    }

    /// When the reminder for this mutation should fire, if any.
    pub fn reminder_fire_at(&self) -> Option<DateTime<Utc>> {
        self.trigger_time
            .map(|t| t - chrono::Duration::minutes(self.reminder_minutes))
    }

    pub fn reminder_title(&self) -> String {
        format!("Reminder: {}", self.title)
    }

    pub fn reminder_body(&self) -> String {
        format!(
            "Your {} \"{}\" starts in {} minutes",
            self.kind.label(),
            self.title,
            self.reminder_minutes
        )
    }
}

fn to_snapshot<T: Serialize>(record: &T) -> AgendirResult<serde_json::Value> {
    serde_json::to_value(record).map_err(|e| AgendirError::Serialization(e.to_string()))
}

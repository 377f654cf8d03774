//! Local record storage.
//!
//! Events and activities are stored as pretty-printed JSON files in the
//! records directory, one file per record. This is the "entity store" the
//! core observes: every mutation made here is routed through the engine
//! before the command returns.

mod create;
mod delete;
mod list;
mod update;

pub use create::create;
pub use delete::delete;
pub use list::list;
pub use update::update;

use std::path::PathBuf;

use agendir_core::entity::{Activity, EntityKind, Event, Mutation, Operation};
use agendir_core::AgendirResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored record, tagged so both kinds can share one directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Event(Event),
    Activity(Activity),
}

impl Record {
    pub fn id(&self) -> &str {
        match self {
            Record::Event(e) => &e.id,
            Record::Activity(a) => &a.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Record::Event(e) => &e.title,
            Record::Activity(a) => &a.title,
        }
    }

    pub fn date(&self) -> DateTime<Utc> {
        match self {
            Record::Event(e) => e.date,
            Record::Activity(a) => a.date,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Event(_) => EntityKind::Event,
            Record::Activity(_) => EntityKind::Activity,
        }
    }

    /// The mutation event the entity store emits for this record.
    pub fn to_mutation(&self, operation: Operation) -> AgendirResult<Mutation> {
        match self {
            Record::Event(e) => Mutation::event(operation, e),
            Record::Activity(a) => Mutation::activity(operation, a),
        }
    }
}

/// A record stored as a local JSON file.
pub struct LocalRecord {
    /// Path to the .json file
    pub path: PathBuf,
    /// The record data
    pub record: Record,
}

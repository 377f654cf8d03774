//! Offline-first agenda core.
//!
//! This crate provides the pieces shared by agendir front ends:
//! - `entity` — event/activity records and the mutation contract
//! - `outbox` — durable FIFO queue of pending mutations
//! - `sync` — single-flight drainer replaying the outbox against a remote
//! - `notify` — one-shot reminder timers, one per entity
//! - `connectivity` — shared online/offline state with subscribe semantics
//! - `engine` — the wiring that keeps all of the above consistent

pub mod connectivity;
pub mod engine;
pub mod entity;
pub mod error;
pub mod notify;
pub mod outbox;
pub mod sync;

pub use connectivity::ConnectivityMonitor;
pub use engine::Engine;
pub use entity::{Activity, EntityKind, Event, Mutation, Operation, Priority};
pub use error::{AgendirError, AgendirResult};
pub use notify::{NotificationKey, NotificationScheduler, Notifier};
pub use outbox::{DeadItem, OutboxItem, OutboxQueue};
pub use sync::{DrainOutcome, DrainReport, RemoteApply, SyncDrainer, SyncFailure};

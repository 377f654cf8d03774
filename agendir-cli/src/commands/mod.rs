//! CLI command implementations.

pub mod clear;
pub mod delete;
pub mod list;
pub mod network;
pub mod new;
pub mod remind;
pub mod status;
pub mod sync;
pub mod update;

use std::sync::Arc;

use agendir_core::connectivity::ConnectivityMonitor;
use agendir_core::engine::Engine;
use agendir_core::notify::NotificationScheduler;
use agendir_core::outbox::OutboxQueue;
use agendir_core::sync::SyncDrainer;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::config::GlobalConfig;
use crate::notifier::DesktopNotifier;
use crate::remote::DirRemote;

/// Everything a command needs: the config plus a fully wired engine.
pub struct App {
    pub config: GlobalConfig,
    pub engine: Engine<DirRemote, DesktopNotifier>,
}

impl App {
    pub fn load(config: GlobalConfig) -> Result<Self> {
        let queue = Arc::new(
            OutboxQueue::open(config.outbox_path())
                .with_context(|| format!("Failed to open outbox in {}", config.data_dir.display()))?,
        );
        // Connectivity is modelled by a marker file, flipped by the
        // `online`/`offline` commands.
        let connectivity = Arc::new(ConnectivityMonitor::new(!config.offline_marker().exists()));
        let drainer = Arc::new(
            SyncDrainer::new(
                Arc::clone(&queue),
                DirRemote::new(&config.remote_dir),
                Arc::clone(&connectivity),
            )
            .with_max_item_age(chrono::Duration::days(config.max_item_age_days)),
        );
        let engine = Engine::new(
            queue,
            drainer,
            NotificationScheduler::new(DesktopNotifier),
            connectivity,
        );
        Ok(App { config, engine })
    }

    pub fn is_online(&self) -> bool {
        self.engine.connectivity().is_online()
    }
}

/// Parse a date/time argument: RFC 3339, or the short `YYYY-MM-DDTHH:MM`
/// form (taken as UTC).
pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
        .with_context(|| format!("Unrecognized date/time: {s} (expected e.g. 2026-03-20T15:00)"))?;
    Ok(naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_short_form_as_utc() {
        let dt = parse_datetime("2026-03-20T15:00").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2026, 3, 20));
        assert_eq!(dt.hour(), 15);
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_datetime("2026-03-20T15:00:00+02:00").unwrap();
        assert_eq!(dt.hour(), 13);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_datetime("next tuesday-ish").is_err());
    }
}

//! Update record files in the records directory.

use super::{LocalRecord, Record};
use anyhow::Result;
use std::path::Path;

/// Update an existing record file.
///
/// Deletes the old file and creates a new one with the updated content.
/// The filename may change if the record's date/time or title changed.
///
/// Returns the updated LocalRecord with the new path.
pub fn update(dir: &Path, old: &LocalRecord, new_record: &Record) -> Result<LocalRecord> {
    super::delete::delete(old)?;
    super::create::create(dir, new_record)
}

#[cfg(test)]
mod tests {
    use super::super::create;
    use super::*;
    use agendir_core::entity::Event;
    use chrono::{TimeZone, Utc};

    #[test]
    fn update_renames_file_when_title_changes() {
        let dir = tempfile::tempdir().unwrap();
        let mut event = Event {
            id: "ev-1".to_string(),
            title: "Old title".to_string(),
            description: None,
            date: Utc.with_ymd_and_hms(2026, 4, 10, 10, 0, 0).unwrap(),
            location: None,
            notifications_enabled: true,
            reminder_minutes: 15,
        };
        let created = create(dir.path(), &Record::Event(event.clone())).unwrap();

        event.title = "New title".to_string();
        let updated = update(dir.path(), &created, &Record::Event(event)).unwrap();

        assert!(!created.path.exists());
        assert!(updated.path.exists());
        assert!(updated.path.ends_with("2026-04-10T1000__new-title.json"));
    }
}

//! List records from the records directory.

use super::{LocalRecord, Record};
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

/// List all records in the records directory.
///
/// Returns a map of record id -> LocalRecord for all .json files found.
/// Files that fail to parse are skipped.
pub fn list(dir: &Path) -> Result<HashMap<String, LocalRecord>> {
    let mut records: HashMap<String, LocalRecord> = HashMap::new();

    if !dir.exists() {
        return Ok(records);
    }

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.extension().map(|e| e == "json").unwrap_or(false)
            && let Ok(content) = std::fs::read_to_string(&path)
            && let Ok(record) = serde_json::from_str::<Record>(&content)
        {
            let id = record.id().to_string();
            records.insert(id, LocalRecord { path, record });
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::super::create;
    use super::*;
    use agendir_core::entity::{Activity, Event, Priority};
    use chrono::{TimeZone, Utc};

    #[test]
    fn lists_both_kinds_and_skips_garbage() {
        let dir = tempfile::tempdir().unwrap();
        create(
            dir.path(),
            &Record::Event(Event {
                id: "ev-1".to_string(),
                title: "Dinner".to_string(),
                description: None,
                date: Utc.with_ymd_and_hms(2026, 5, 1, 19, 0, 0).unwrap(),
                location: Some("Downtown".to_string()),
                notifications_enabled: true,
                reminder_minutes: 15,
            }),
        )
        .unwrap();
        create(
            dir.path(),
            &Record::Activity(Activity {
                id: "ac-1".to_string(),
                owner: "me".to_string(),
                title: "Buy gift".to_string(),
                description: None,
                date: Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap(),
                location: None,
                category: Some("personal".to_string()),
                completed: false,
                priority: Priority::High,
            }),
        )
        .unwrap();
        std::fs::write(dir.path().join("junk.json"), "{ nope").unwrap();

        let records = list(dir.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert!(matches!(records["ev-1"].record, Record::Event(_)));
        assert!(matches!(records["ac-1"].record, Record::Activity(_)));
    }

    #[test]
    fn missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let records = list(&dir.path().join("nope")).unwrap();
        assert!(records.is_empty());
    }
}

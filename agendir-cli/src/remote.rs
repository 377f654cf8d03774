//! Filesystem remote: applies outbox items to a directory that stands in
//! for the server-side store.
//!
//! Swapping this for a real network client only means providing another
//! `RemoteApply` implementation; the core never knows the difference.

use std::path::PathBuf;

use agendir_core::entity::Operation;
use agendir_core::outbox::OutboxItem;
use agendir_core::sync::{RemoteApply, SyncFailure};

pub struct DirRemote {
    dir: PathBuf,
}

impl DirRemote {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirRemote { dir: dir.into() }
    }

    fn record_path(&self, item: &OutboxItem) -> PathBuf {
        self.dir
            .join(format!("{}-{}.json", item.entity_kind.label(), item.entity_id))
    }
}

impl RemoteApply for DirRemote {
    async fn apply(&self, item: &OutboxItem) -> Result<(), SyncFailure> {
        match item.operation {
            Operation::Create | Operation::Update => {
                if !item.payload.is_object() {
                    return Err(SyncFailure::Permanent(format!(
                        "payload for {} is not a record",
                        item.entity_id
                    )));
                }
                let content = serde_json::to_string_pretty(&item.payload)
                    .map_err(|e| SyncFailure::Permanent(e.to_string()))?;
                std::fs::create_dir_all(&self.dir)
                    .map_err(|e| SyncFailure::Transient(e.to_string()))?;
                std::fs::write(self.record_path(item), content)
                    .map_err(|e| SyncFailure::Transient(e.to_string()))?;
            }
            Operation::Delete => {
                match std::fs::remove_file(self.record_path(item)) {
                    Ok(()) => {}
                    // Already gone remotely: deletes are idempotent.
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(SyncFailure::Transient(e.to_string())),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agendir_core::entity::EntityKind;

    fn make_item(entity_id: &str, operation: Operation, payload: serde_json::Value) -> OutboxItem {
        OutboxItem::new(entity_id, EntityKind::Event, operation, payload)
    }

    #[tokio::test]
    async fn create_then_delete_leaves_no_remote_record() {
        let dir = tempfile::tempdir().unwrap();
        let remote = DirRemote::new(dir.path());

        let payload = serde_json::json!({ "id": "5", "title": "Ephemeral" });
        remote
            .apply(&make_item("5", Operation::Create, payload))
            .await
            .unwrap();
        assert!(dir.path().join("event-5.json").exists());

        remote
            .apply(&make_item("5", Operation::Delete, serde_json::json!({ "id": "5" })))
            .await
            .unwrap();
        assert!(!dir.path().join("event-5.json").exists());
    }

    #[tokio::test]
    async fn delete_of_missing_record_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let remote = DirRemote::new(dir.path());
        remote
            .apply(&make_item("ghost", Operation::Delete, serde_json::json!({})))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_object_payload_is_permanent_failure() {
        let dir = tempfile::tempdir().unwrap();
        let remote = DirRemote::new(dir.path());
        let result = remote
            .apply(&make_item("5", Operation::Create, serde_json::json!("scalar")))
            .await;
        assert!(matches!(result, Err(SyncFailure::Permanent(_))));
    }

    #[tokio::test]
    async fn update_overwrites_existing_record() {
        let dir = tempfile::tempdir().unwrap();
        let remote = DirRemote::new(dir.path());

        remote
            .apply(&make_item("5", Operation::Create, serde_json::json!({ "v": 1 })))
            .await
            .unwrap();
        remote
            .apply(&make_item("5", Operation::Update, serde_json::json!({ "v": 2 })))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join("event-5.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["v"], 2);
    }
}

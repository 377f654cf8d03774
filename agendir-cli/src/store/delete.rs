//! Delete record files from the records directory.

use super::LocalRecord;
use anyhow::{Context, Result};

/// Delete a record file from the records directory.
pub fn delete(local_record: &LocalRecord) -> Result<()> {
    std::fs::remove_file(&local_record.path)
        .with_context(|| format!("Failed to delete {}", local_record.path.display()))?;
    Ok(())
}

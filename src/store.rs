//! Schedule document persistence.
//!
//! Loading is plain JSON deserialization with context-rich errors. Saving is
//! destructive-safe: the existing document is renamed to a timestamped
//! `.backup` next to it before the new one is written, so every accepted
//! edit leaves the previous schedule recoverable.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use log::info;

use crate::entities::ScheduleDoc;

/// Load a schedule document from disk.
pub fn load_document(path: &Path) -> Result<ScheduleDoc> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read schedule {}", path.display()))?;
    let doc: ScheduleDoc = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse schedule {}", path.display()))?;
    Ok(doc)
}

/// Write a schedule document, moving any existing file aside first.
///
/// Returns the backup path when one was created.
pub fn save_document(path: &Path, doc: &ScheduleDoc) -> Result<Option<PathBuf>> {
    let backup = if path.exists() {
        let backup = backup_path(path);
        fs::rename(path, &backup).with_context(|| {
            format!(
                "failed to move old schedule {} to {}",
                path.display(),
                backup.display()
            )
        })?;
        info!("renamed old schedule to {}", backup.display());
        Some(backup)
    } else {
        None
    };

    let json = serde_json::to_string_pretty(doc).context("failed to serialize schedule")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write schedule {}", path.display()))?;
    info!("saved schedule to {}", path.display());
    Ok(backup)
}

fn backup_path(path: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d-%H%M%S");
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("schedule");
    path.with_file_name(format!("{}_{}.backup", stem, stamp))
}

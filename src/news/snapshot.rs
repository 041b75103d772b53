use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::info;

use super::model::{NormalizedArticle, Snapshot};
use crate::error::SnapshotError;

impl Snapshot {
    pub fn new(last_updated: DateTime<Utc>, articles: Vec<NormalizedArticle>) -> Self {
        Self {
            last_updated,
            articles,
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> SnapshotError {
    SnapshotError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Replace the snapshot at `path`.
///
/// The JSON goes to a sibling temp file first and is renamed over the
/// target, so readers see either the old or the new document.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), SnapshotError> {
    let json = serde_json::to_string_pretty(snapshot)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    std::fs::write(&tmp_path, json).map_err(|e| io_error(&tmp_path, e))?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(io_error(path, e));
    }

    info!(
        path = %path.display(),
        articles = snapshot.articles.len(),
        "Snapshot written"
    );
    Ok(())
}

pub async fn read_snapshot(path: &Path) -> Result<Snapshot, SnapshotError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SnapshotError::Read {
            path: path.display().to_string(),
            source,
        })?;

    serde_json::from_str(&content).map_err(|source| SnapshotError::Parse {
        path: path.display().to_string(),
        source,
    })
}

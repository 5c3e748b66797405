use crate::error::SessionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// On-disk form of an attempt that has not been submitted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptSnapshot {
    pub quiz_id: String,
    pub answers: BTreeMap<usize, String>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub cursor: usize,
}

pub async fn save_snapshot(path: impl AsRef<Path>, snapshot: &AttemptSnapshot) -> Result<(), SessionError> {
    let path = path.as_ref();
    let serialized = serde_json::to_vec_pretty(snapshot)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, serialized).await?;
    Ok(())
}

/// Reads a snapshot. A missing file yields `Ok(None)`.
pub async fn load_snapshot(path: impl AsRef<Path>) -> Result<Option<AttemptSnapshot>, SessionError> {
    let raw = match tokio::fs::read_to_string(path.as_ref()).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    match serde_json::from_str::<AttemptSnapshot>(&raw) {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(err) => {
            warn!("failed to read attempt snapshot {}: {}", path.as_ref().display(), err);
            Err(err.into())
        }
    }
}

pub async fn remove_snapshot(path: impl AsRef<Path>) -> Result<(), SessionError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn snapshot() -> AttemptSnapshot {
        AttemptSnapshot {
            quiz_id: "quiz-1".into(),
            answers: BTreeMap::from([(1, "A".to_string()), (3, "C".to_string())]),
            started_at: Utc.with_ymd_and_hms(2026, 2, 2, 8, 30, 0).unwrap(),
            cursor: 2,
        }
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("attempt.json");
        save_snapshot(&path, &snapshot()).await.unwrap();
        assert_eq!(load_snapshot(&path).await.unwrap(), Some(snapshot()));
        remove_snapshot(&path).await.unwrap();
        assert_eq!(load_snapshot(&path).await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_file_is_not_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_snapshot(dir.path().join("none.json")).await.unwrap().is_none());
        remove_snapshot(dir.path().join("none.json")).await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("attempt.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();
        assert!(matches!(load_snapshot(&path).await, Err(SessionError::SnapshotDecode(_))));
    }
}

//! Snapshot store backed by a single JSON file

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};
use trellis_core::{
    AddressBookSnapshot, SnapshotStore, StorageError, StorageResult, SNAPSHOT_VERSION,
};

/// Reads and writes [`AddressBookSnapshot`]s as JSON.
///
/// Saves go to a sibling `.tmp` file first and are renamed into place, so a
/// crash mid-write never leaves a truncated address book behind.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    path: PathBuf,
    pretty: bool,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
        }
    }

    /// Builder-style: choose indented or compact output
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for JsonSnapshotStore {
    async fn load(&self) -> StorageResult<Option<AddressBookSnapshot>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot yet");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: AddressBookSnapshot = serde_json::from_str(&content).map_err(|e| {
            StorageError::deserialization(format!("{}: {}", self.path.display(), e))
        })?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        debug!(
            path = %self.path.display(),
            contacts = snapshot.contacts.len(),
            "loaded snapshot"
        );
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &AddressBookSnapshot) -> StorageResult<()> {
        let json = if self.pretty {
            serde_json::to_string_pretty(snapshot)
        } else {
            serde_json::to_string(snapshot)
        }
        .map_err(|e| StorageError::serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, json).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        info!(path = %self.path.display(), "saved snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_is_a_sibling() {
        let store = JsonSnapshotStore::new("/data/trellis/addressbook.json");
        assert_eq!(
            store.temp_path(),
            PathBuf::from("/data/trellis/addressbook.json.tmp")
        );
    }

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("absent.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("book.json");
        let store = JsonSnapshotStore::new(&path).with_pretty(false);

        store.save(&AddressBookSnapshot::default()).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains('\n'));
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn malformed_json_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonSnapshotStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StorageError::Deserialization(_)));
        assert!(err.is_corruption());
    }

    #[tokio::test]
    async fn future_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.json");
        std::fs::write(&path, r#"{"version": 99, "contacts": [], "tag_hierarchy": {}}"#).unwrap();

        let err = JsonSnapshotStore::new(&path).load().await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::UnsupportedVersion {
                found: 99,
                expected: 1
            }
        ));
    }
}

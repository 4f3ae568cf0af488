//! Snapshot storage abstraction
//!
//! The model does not know where snapshots live. Backends implement
//! [`SnapshotStore`]; the JSON file backend lives in `trellis-storage`.

use async_trait::async_trait;
use thiserror::Error;

use crate::error::CoreError;
use crate::snapshot::AddressBookSnapshot;

/// Error type for snapshot persistence
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Corrupted data detected: {0}")]
    CorruptedData(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Create a serialization error
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a deserialization error
    pub fn deserialization<S: Into<String>>(msg: S) -> Self {
        Self::Deserialization(msg.into())
    }

    /// Check if the error indicates the stored data itself is bad
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::Deserialization(_) | Self::UnsupportedVersion { .. } | Self::CorruptedData(_)
        )
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<CoreError> for StorageError {
    fn from(err: CoreError) -> Self {
        Self::CorruptedData(err.to_string())
    }
}

/// Load and save whole-model snapshots
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the last saved snapshot, or `None` if nothing was saved yet
    async fn load(&self) -> StorageResult<Option<AddressBookSnapshot>>;

    /// Replace the stored snapshot
    async fn save(&self, snapshot: &AddressBookSnapshot) -> StorageResult<()>;
}

//! File records derived from filesystem metadata.

use std::fs::Metadata;
use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, Utc};

/// A file in the store, as seen at the moment it was read.
///
/// Nothing here is persisted; every field comes from the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Name inside the store directory.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Birth time, or modification time where the platform has no birth time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub modified_at: DateTime<Utc>,
}

impl FileRecord {
    /// Build a record from a name and its metadata.
    pub fn from_metadata(name: impl Into<String>, metadata: &Metadata) -> Self {
        let modified_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| DateTime::<Utc>::from(SystemTime::UNIX_EPOCH));
        let created_at = metadata
            .created()
            .map(DateTime::<Utc>::from)
            .unwrap_or(modified_at);

        Self {
            name: name.into(),
            size: metadata.len(),
            created_at,
            modified_at,
        }
    }
}

/// Result of storing one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Final name, possibly with a collision suffix.
    pub name: String,
    /// Bytes written.
    pub size: u64,
    /// Modification time after the write.
    pub modified_at: DateTime<Utc>,
    /// Store directory joined with the final name.
    pub path: PathBuf,
}

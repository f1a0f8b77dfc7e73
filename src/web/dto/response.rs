//! Response DTOs for the Web API.
//!
//! Field names follow the browser client's camelCase contract.

use serde::Serialize;
use utoipa::ToSchema;

use crate::datetime::to_rfc3339;
use crate::file::{FileRecord, StoredFile};

/// A file as shown in the listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Creation time (RFC3339).
    pub creation_date: String,
    /// Last modification time (RFC3339).
    pub last_modified_date: String,
}

impl From<FileRecord> for FileResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            creation_date: to_rfc3339(&record.created_at),
            last_modified_date: to_rfc3339(&record.modified_at),
            name: record.name,
            size: record.size,
        }
    }
}

/// GET /api/files/list response.
#[derive(Debug, Serialize, ToSchema)]
pub struct FileListResponse {
    /// Files in enumeration order.
    pub files: Vec<FileResponse>,
}

/// A file written by an upload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredFileResponse {
    /// Final stored name, possibly suffixed.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Modification time after the write (RFC3339).
    pub last_modified_date: String,
    /// Storage path.
    pub path: String,
}

impl From<StoredFile> for StoredFileResponse {
    fn from(stored: StoredFile) -> Self {
        Self {
            last_modified_date: to_rfc3339(&stored.modified_at),
            path: stored.path.display().to_string(),
            name: stored.name,
            size: stored.size,
        }
    }
}

/// POST /api/files response.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Confirmation message.
    pub message: String,
    /// Last stored file.
    pub file: StoredFileResponse,
    /// Every stored file, in part order.
    pub files: Vec<StoredFileResponse>,
}

/// Plain confirmation.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Confirmation message.
    pub message: String,
}

impl MessageResponse {
    /// Create a new message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// PUT /api/files/{name}/rename response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameResponse {
    /// Confirmation message.
    pub message: String,
    /// Final name, new base plus the preserved extension.
    pub new_name: String,
}

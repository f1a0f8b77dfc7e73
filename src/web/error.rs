//! API error handling for the filedrop Web API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::FiledropError;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Missing or malformed input (400).
    InvalidRequest,
    /// Upload without a `file` part (400).
    MissingFile,
    /// Upload part without a usable file name (400).
    InvalidName,
    /// Target file absent or outside the store (404).
    NotFound,
    /// Rename target already exists (409).
    Conflict,
    /// Request body over the configured ceiling (413).
    PayloadTooLarge,
    /// Disk error while writing, renaming or deleting (500).
    StoreWriteFailed,
    /// Disk error while listing, stating or reading (500).
    StoreReadFailed,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidRequest | ErrorCode::MissingFile | ErrorCode::InvalidName => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::StoreWriteFailed | ErrorCode::StoreReadFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Create an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Create a missing file error.
    pub fn missing_file(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MissingFile, message)
    }

    /// Create an invalid name error.
    pub fn invalid_name(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidName, message)
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Create a payload too large error.
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PayloadTooLarge, message)
    }

    /// Create a store read error.
    pub fn store_read_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreReadFailed, message)
    }

    /// Map a store error from a read path (list, download).
    ///
    /// I/O details are logged and replaced by a generic message.
    pub fn from_read(err: FiledropError) -> Self {
        Self::from_store(err, ErrorCode::StoreReadFailed)
    }

    /// Map a store error from a write path (upload, rename, delete).
    pub fn from_write(err: FiledropError) -> Self {
        Self::from_store(err, ErrorCode::StoreWriteFailed)
    }

    fn from_store(err: FiledropError, io_code: ErrorCode) -> Self {
        match err {
            FiledropError::InvalidName(_) => ApiError::invalid_request("Invalid file name"),
            FiledropError::NotFound(_) => ApiError::not_found("File not found"),
            FiledropError::AlreadyExists(name) => {
                ApiError::conflict(format!("A file named {name} already exists"))
            }
            FiledropError::Validation(msg) => ApiError::invalid_request(msg),
            other => {
                tracing::error!(error = %other, "Store operation failed");
                let message = match io_code {
                    ErrorCode::StoreWriteFailed => "Error saving file",
                    _ => "Error reading files",
                };
                ApiError::new(io_code, message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

//! File handlers for the Web API.

use axum::{
    body::{Body, Bytes},
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::PathRejection,
        Multipart, Path, State,
    },
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::file::{client_file_name, validate_file_name};
use crate::web::dto::{
    FileListResponse, FileResponse, MessageResponse, RenameResponse, StoredFileResponse,
    UploadResponse,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Multipart field carrying uploaded files.
const FILE_FIELD: &str = "file";

/// Generate a safe Content-Disposition header value for file downloads.
///
/// The quoted `filename` fallback only keeps printable ASCII: control
/// characters are dropped, and quotes, backslashes and non-ASCII characters
/// become `_`. Names that needed any of that also get an RFC 5987
/// `filename*` parameter carrying the exact UTF-8 name.
fn content_disposition_header(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            c => c,
        })
        .collect();

    if fallback == filename {
        return format!("attachment; filename=\"{fallback}\"");
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

/// Map a multipart read failure. Bodies over the limit surface here too.
fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!("Upload rejected: {}", err.body_text());
        ApiError::payload_too_large("File too large")
    } else {
        tracing::warn!("Failed to read multipart data: {}", err.body_text());
        ApiError::invalid_request("Invalid multipart data")
    }
}

/// Unwrap the `{name}` path segment, rejecting undecodable ones as JSON errors.
fn path_name(path: Result<Path<String>, PathRejection>) -> Result<String, ApiError> {
    match path {
        Ok(Path(name)) => Ok(name),
        Err(e) => {
            tracing::warn!("Rejected file name path segment: {}", e.body_text());
            Err(ApiError::invalid_request("Invalid file name"))
        }
    }
}

/// GET /api/files/list - List stored files.
#[utoipa::path(
    get,
    path = "/api/files/list",
    tag = "files",
    responses(
        (status = 200, description = "Files in the store", body = FileListResponse),
        (status = 500, description = "Store directory unreadable", body = crate::web::error::ErrorBody)
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FileListResponse>, ApiError> {
    let records = state.store.list().await.map_err(ApiError::from_read)?;

    let files = records.into_iter().map(FileResponse::from).collect();

    Ok(Json(FileListResponse { files }))
}

/// POST /api/files - Upload one or more files.
///
/// Request body: multipart/form-data with one or more "file" parts. Other
/// fields are ignored.
#[utoipa::path(
    post,
    path = "/api/files",
    tag = "files",
    request_body(
        content = String,
        content_type = "multipart/form-data",
        description = "One or more `file` parts"
    ),
    responses(
        (status = 200, description = "Files stored", body = UploadResponse),
        (status = 400, description = "No file part or a part without a name", body = crate::web::error::ErrorBody),
        (status = 413, description = "Request body too large", body = crate::web::error::ErrorBody),
        (status = 500, description = "Write failure", body = crate::web::error::ErrorBody)
    )
)]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::warn!("Upload without multipart body: {}", e);
        ApiError::missing_file("No file provided")
    })?;

    let mut stored: Vec<StoredFileResponse> = Vec::new();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let name = client_file_name(field.file_name().unwrap_or_default())
            .map_err(|_| ApiError::invalid_name("File must have a name"))?;

        let mut upload = state
            .store
            .begin_upload(&name)
            .await
            .map_err(ApiError::from_write)?;

        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    if let Err(e) = upload.write_chunk(&chunk).await {
                        upload.abort().await;
                        return Err(ApiError::from_write(e));
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    upload.abort().await;
                    return Err(multipart_error(e));
                }
            }
        }

        let file = upload.finish().await.map_err(ApiError::from_write)?;
        tracing::info!(requested = %name, stored = %file.name, size = file.size, "File uploaded");
        stored.push(file.into());
    }

    // Every `file` part is either stored or has already failed the request.
    let file = stored
        .last()
        .cloned()
        .ok_or_else(|| ApiError::missing_file("No file provided"))?;

    Ok(Json(UploadResponse {
        message: "File saved successfully".to_string(),
        file,
        files: stored,
    }))
}

/// GET /api/files/{name}/download - Download a file.
#[utoipa::path(
    get,
    path = "/api/files/{name}/download",
    tag = "files",
    params(
        ("name" = String, Path, description = "File name")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 400, description = "Name is not a single path component", body = crate::web::error::ErrorBody),
        (status = 404, description = "File not found", body = crate::web::error::ErrorBody)
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response<Body>, ApiError> {
    let name = path_name(path)?;
    let (file, record) = state.store.open(&name).await.map_err(ApiError::from_read)?;

    tracing::debug!(name = %record.name, size = record.size, "Streaming download");

    Response::builder()
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&record.name),
        )
        .header(header::CONTENT_LENGTH, record.size)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::store_read_failed("Failed to build response")
        })
}

/// DELETE /api/files/{name}/delete - Delete a file.
#[utoipa::path(
    delete,
    path = "/api/files/{name}/delete",
    tag = "files",
    params(
        ("name" = String, Path, description = "File name")
    ),
    responses(
        (status = 200, description = "File deleted", body = MessageResponse),
        (status = 400, description = "Name is not a single path component", body = crate::web::error::ErrorBody),
        (status = 404, description = "File not found", body = crate::web::error::ErrorBody)
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let name = path_name(path)?;
    state.store.delete(&name).await.map_err(ApiError::from_write)?;

    tracing::info!(name = %name, "File deleted");

    Ok(Json(MessageResponse::new("File deleted successfully")))
}

/// PUT /api/files/{name}/rename - Rename a file.
///
/// Request body: the new base name as raw text. Surrounding whitespace is
/// ignored and the original extension is kept.
#[utoipa::path(
    put,
    path = "/api/files/{name}/rename",
    tag = "files",
    params(
        ("name" = String, Path, description = "Current file name")
    ),
    request_body(content = String, content_type = "text/plain", description = "New base name"),
    responses(
        (status = 200, description = "File renamed", body = RenameResponse),
        (status = 400, description = "Invalid current or new name", body = crate::web::error::ErrorBody),
        (status = 404, description = "File not found", body = crate::web::error::ErrorBody),
        (status = 409, description = "Target name already exists", body = crate::web::error::ErrorBody)
    )
)]
pub async fn rename_file(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<Json<RenameResponse>, ApiError> {
    let name = path_name(path)?;
    validate_file_name(&name).map_err(|_| ApiError::invalid_request("Invalid file name"))?;

    let new_name = std::str::from_utf8(&body)
        .map_err(|_| ApiError::invalid_request("Invalid new name"))?
        .trim();
    if new_name.is_empty() {
        return Err(ApiError::invalid_request("No new name provided"));
    }

    let final_name = state
        .store
        .rename(&name, new_name)
        .await
        .map_err(ApiError::from_write)?;

    tracing::info!(from = %name, to = %final_name, "File renamed");

    Ok(Json(RenameResponse {
        message: "File renamed successfully".to_string(),
        new_name: final_name,
    }))
}

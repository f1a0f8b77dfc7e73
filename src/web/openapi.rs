//! OpenAPI document for the file API.

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use super::dto::{
    FileListResponse, FileResponse, MessageResponse, RenameResponse, StoredFileResponse,
    UploadResponse,
};
use super::error::{ErrorBody, ErrorCode, ErrorDetail};
use super::handlers::file;

/// OpenAPI description of every file endpoint.
#[derive(OpenApi)]
#[openapi(
    paths(
        file::list_files,
        file::upload_files,
        file::download_file,
        file::delete_file,
        file::rename_file,
    ),
    components(schemas(
        FileResponse,
        FileListResponse,
        StoredFileResponse,
        UploadResponse,
        MessageResponse,
        RenameResponse,
        ErrorBody,
        ErrorDetail,
        ErrorCode,
    )),
    tags((name = "files", description = "Flat file store"))
)]
pub struct ApiDoc;

/// Router serving the document at `/api-docs/openapi.json`.
pub fn create_openapi_router() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

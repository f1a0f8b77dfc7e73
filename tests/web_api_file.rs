//! Web API File Tests
//!
//! Integration tests for the list, upload, download, rename and delete
//! endpoints.

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use filedrop::config::WebConfig;
use filedrop::file::FileStore;
use filedrop::web::handlers::AppState;
use filedrop::web::router::create_router;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Default body limit for tests (1MB).
const TEST_BODY_LIMIT: usize = 1024 * 1024;

/// Test fixture: a server over a store inside a temp directory.
///
/// The store lives in `<tmp>/files` so tests can place files next to it and
/// check they are never reached.
struct TestContext {
    server: TestServer,
    temp_dir: TempDir,
}

impl TestContext {
    fn store_path(&self) -> PathBuf {
        self.temp_dir.path().join("files")
    }

    fn outside_path(&self) -> &Path {
        self.temp_dir.path()
    }
}

/// Create a test server with the default body limit.
fn create_test_server() -> TestContext {
    create_test_server_with_limit(TEST_BODY_LIMIT)
}

/// Create a test server with a custom body limit.
fn create_test_server_with_limit(body_limit: usize) -> TestContext {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = FileStore::new(temp_dir.path().join("files")).expect("Failed to create store");

    let app_state = Arc::new(AppState::new(store));
    let router = create_router(app_state, &WebConfig::default(), body_limit);

    let server = TestServer::new(router).expect("Failed to create test server");

    TestContext { server, temp_dir }
}

/// Build a form with one `file` part.
fn file_form(name: &str, content: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(content.to_vec())
            .file_name(name)
            .mime_type("application/octet-stream"),
    )
}

/// Upload one file and return the response body.
async fn upload(ctx: &TestContext, name: &str, content: &[u8]) -> Value {
    let response = ctx
        .server
        .post("/api/files")
        .multipart(file_form(name, content))
        .await;

    response.assert_status_ok();
    response.json::<Value>()
}

/// Names currently reported by the list endpoint.
async fn listed_names(ctx: &TestContext) -> Vec<String> {
    let response = ctx.server.get("/api/files/list").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let mut names: Vec<String> = body["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap()
}

// ============================================================================
// List Tests
// ============================================================================

#[tokio::test]
async fn test_list_empty() {
    let ctx = create_test_server();

    let response = ctx.server.get("/api/files/list").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["files"].is_array());
    assert_eq!(body["files"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_list_reports_size_and_dates() {
    let ctx = create_test_server();
    let content = b"exactly twenty bytes";
    upload(&ctx, "sized.txt", content).await;

    let response = ctx.server.get("/api/files/list").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "sized.txt");
    assert_eq!(files[0]["size"].as_u64().unwrap(), content.len() as u64);
    assert!(files[0]["creationDate"].as_str().unwrap().ends_with('Z'));
    assert!(files[0]["lastModifiedDate"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_list_missing_store_directory_is_empty() {
    let ctx = create_test_server();
    std::fs::remove_dir_all(ctx.store_path()).unwrap();

    let response = ctx.server.get("/api/files/list").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["files"].as_array().unwrap().len(), 0);
}

// ============================================================================
// Upload Tests
// ============================================================================

#[tokio::test]
async fn test_upload_file() {
    let ctx = create_test_server();

    let body = upload(&ctx, "hello.txt", b"Hello, World!").await;

    assert_eq!(body["message"], "File saved successfully");
    assert_eq!(body["file"]["name"], "hello.txt");
    assert_eq!(body["file"]["size"], 13);
    assert!(body["file"]["lastModifiedDate"].is_string());
    assert!(body["file"]["path"].as_str().unwrap().ends_with("hello.txt"));

    let stored = std::fs::read(ctx.store_path().join("hello.txt")).unwrap();
    assert_eq!(stored, b"Hello, World!");
}

#[tokio::test]
async fn test_upload_collision_suffixes() {
    let ctx = create_test_server();

    let first = upload(&ctx, "a.txt", b"one").await;
    let second = upload(&ctx, "a.txt", b"two").await;
    let third = upload(&ctx, "a.txt", b"three").await;

    assert_eq!(first["file"]["name"], "a.txt");
    assert_eq!(second["file"]["name"], "a(1).txt");
    assert_eq!(third["file"]["name"], "a(2).txt");

    assert_eq!(listed_names(&ctx).await, vec!["a(1).txt", "a(2).txt", "a.txt"]);
    assert_eq!(std::fs::read(ctx.store_path().join("a.txt")).unwrap(), b"one");
}

#[tokio::test]
async fn test_upload_multiple_parts() {
    let ctx = create_test_server();

    let form = MultipartForm::new()
        .add_part("file", Part::bytes(b"first".to_vec()).file_name("one.txt"))
        .add_text("description", "ignored")
        .add_part("file", Part::bytes(b"second".to_vec()).file_name("two.txt"));

    let response = ctx.server.post("/api/files").multipart(form).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["file"]["name"], "two.txt");
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["name"], "one.txt");
    assert_eq!(files[1]["name"], "two.txt");

    assert_eq!(listed_names(&ctx).await, vec!["one.txt", "two.txt"]);
}

#[tokio::test]
async fn test_upload_without_file_part() {
    let ctx = create_test_server();

    let form = MultipartForm::new().add_text("description", "no file here");
    let response = ctx.server.post("/api/files").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "MISSING_FILE");
}

#[tokio::test]
async fn test_upload_not_multipart() {
    let ctx = create_test_server();

    let response = ctx.server.post("/api/files").text("just text").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "MISSING_FILE");
}

#[tokio::test]
async fn test_upload_without_file_name() {
    let ctx = create_test_server();

    let form = MultipartForm::new().add_part("file", Part::bytes(b"anonymous".to_vec()));
    let response = ctx.server.post("/api/files").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "INVALID_NAME");
    assert!(listed_names(&ctx).await.is_empty());
}

#[tokio::test]
async fn test_upload_strips_client_directories() {
    let ctx = create_test_server();

    let body = upload(&ctx, "../../escape.txt", b"contained").await;

    assert_eq!(body["file"]["name"], "escape.txt");
    assert!(ctx.store_path().join("escape.txt").exists());
    assert!(!ctx.outside_path().join("escape.txt").exists());
}

#[tokio::test]
async fn test_upload_too_large() {
    let ctx = create_test_server_with_limit(1024);

    let response = ctx
        .server
        .post("/api/files")
        .multipart(file_form("big.bin", &vec![0u8; 8 * 1024]))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error_code(&response.json::<Value>()), "PAYLOAD_TOO_LARGE");
    assert!(listed_names(&ctx).await.is_empty());
}

// ============================================================================
// Download Tests
// ============================================================================

#[tokio::test]
async fn test_download_round_trip() {
    let ctx = create_test_server();
    let content: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    upload(&ctx, "data.bin", &content).await;

    let response = ctx.server.get("/api/files/data.bin/download").await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), content.as_slice());
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        "application/octet-stream"
    );
    assert_eq!(
        response.header("content-disposition").to_str().unwrap(),
        "attachment; filename=\"data.bin\""
    );
}

#[tokio::test]
async fn test_download_suffixed_name() {
    let ctx = create_test_server();
    upload(&ctx, "a.txt", b"one").await;
    upload(&ctx, "a.txt", b"two").await;

    let response = ctx.server.get("/api/files/a(1).txt/download").await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"two");
}

#[tokio::test]
async fn test_download_not_found() {
    let ctx = create_test_server();

    let response = ctx.server.get("/api/files/missing.txt/download").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(error_code(&response.json::<Value>()), "NOT_FOUND");
}

#[tokio::test]
async fn test_download_rejects_encoded_traversal() {
    let ctx = create_test_server();
    std::fs::write(ctx.outside_path().join("secret.txt"), b"secret").unwrap();

    let response = ctx.server.get("/api/files/..%2Fsecret.txt/download").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "INVALID_REQUEST");
}

#[tokio::test]
async fn test_download_rejects_raw_traversal() {
    let ctx = create_test_server();
    std::fs::write(ctx.outside_path().join("secret.txt"), b"secret").unwrap();

    let response = ctx.server.get("/api/files/../secret.txt/download").await;

    let status = response.status_code();
    assert!(
        status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND,
        "unexpected status {status}"
    );
    assert_ne!(response.as_bytes().as_ref(), b"secret");
}

#[tokio::test]
async fn test_invalid_utf8_name_is_json_error() {
    let ctx = create_test_server();

    let download = ctx.server.get("/api/files/%FF/download").await;
    download.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&download.json::<Value>()), "INVALID_REQUEST");

    let delete = ctx.server.delete("/api/files/%FF/delete").await;
    delete.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&delete.json::<Value>()), "INVALID_REQUEST");

    let rename = ctx.server.put("/api/files/%FF/rename").text("other").await;
    rename.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&rename.json::<Value>()), "INVALID_REQUEST");
}

// ============================================================================
// Delete Tests
// ============================================================================

#[tokio::test]
async fn test_delete_file() {
    let ctx = create_test_server();
    upload(&ctx, "delete-me.txt", b"bye").await;

    let response = ctx.server.delete("/api/files/delete-me.txt/delete").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "File deleted successfully");

    assert!(listed_names(&ctx).await.is_empty());
    ctx.server
        .get("/api/files/delete-me.txt/download")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_not_found() {
    let ctx = create_test_server();

    let response = ctx.server.delete("/api/files/missing.txt/delete").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(error_code(&response.json::<Value>()), "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_rejects_traversal() {
    let ctx = create_test_server();
    let secret = ctx.outside_path().join("secret.txt");
    std::fs::write(&secret, b"secret").unwrap();

    let response = ctx.server.delete("/api/files/..%2Fsecret.txt/delete").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(secret.exists());
}

// ============================================================================
// Rename Tests
// ============================================================================

#[tokio::test]
async fn test_rename_preserves_extension() {
    let ctx = create_test_server();
    upload(&ctx, "report.pdf", b"%PDF-1.7").await;

    let response = ctx
        .server
        .put("/api/files/report.pdf/rename")
        .text("final")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "File renamed successfully");
    assert_eq!(body["newName"], "final.pdf");

    assert_eq!(listed_names(&ctx).await, vec!["final.pdf"]);
    let download = ctx.server.get("/api/files/final.pdf/download").await;
    download.assert_status_ok();
    assert_eq!(download.as_bytes().as_ref(), b"%PDF-1.7");
}

#[tokio::test]
async fn test_rename_overrides_caller_extension() {
    let ctx = create_test_server();
    upload(&ctx, "report.pdf", b"%PDF").await;

    let response = ctx
        .server
        .put("/api/files/report.pdf/rename")
        .text("final.txt")
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["newName"], "final.pdf");
}

#[tokio::test]
async fn test_rename_empty_body() {
    let ctx = create_test_server();
    upload(&ctx, "report.pdf", b"%PDF").await;

    let response = ctx.server.put("/api/files/report.pdf/rename").text("").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "INVALID_REQUEST");
    assert_eq!(listed_names(&ctx).await, vec!["report.pdf"]);
}

#[tokio::test]
async fn test_rename_not_found() {
    let ctx = create_test_server();

    let response = ctx
        .server
        .put("/api/files/missing.pdf/rename")
        .text("final")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rename_conflict() {
    let ctx = create_test_server();
    upload(&ctx, "report.pdf", b"old").await;
    upload(&ctx, "final.pdf", b"keep").await;

    let response = ctx
        .server
        .put("/api/files/report.pdf/rename")
        .text("final")
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(error_code(&response.json::<Value>()), "CONFLICT");
    assert_eq!(listed_names(&ctx).await, vec!["final.pdf", "report.pdf"]);
    assert_eq!(std::fs::read(ctx.store_path().join("final.pdf")).unwrap(), b"keep");
}

#[tokio::test]
async fn test_rename_rejects_traversal_in_new_name() {
    let ctx = create_test_server();
    upload(&ctx, "report.pdf", b"%PDF").await;

    let response = ctx
        .server
        .put("/api/files/report.pdf/rename")
        .text("../escaped")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(!ctx.outside_path().join("escaped.pdf").exists());
    assert_eq!(listed_names(&ctx).await, vec!["report.pdf"]);
}

#[tokio::test]
async fn test_rename_rejects_traversal_in_source() {
    let ctx = create_test_server();
    let secret = ctx.outside_path().join("secret.txt");
    std::fs::write(&secret, b"secret").unwrap();

    let response = ctx
        .server
        .put("/api/files/..%2Fsecret.txt/rename")
        .text("stolen")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(secret.exists());
    assert!(!ctx.store_path().join("stolen.txt").exists());
}

// ============================================================================
// Middleware Tests
// ============================================================================

#[tokio::test]
async fn test_security_headers_on_api() {
    let ctx = create_test_server();

    let response = ctx.server.get("/api/files/list").await;

    response.assert_status_ok();
    assert_eq!(
        response.header("x-content-type-options").to_str().unwrap(),
        "nosniff"
    );
    assert_eq!(response.header("cache-control").to_str().unwrap(), "no-store");
}

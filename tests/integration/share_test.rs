//! Integration tests for file upload, download and expiry.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;

use helpers::{TestApp, test_config};

#[tokio::test]
async fn test_upload_then_download() {
    let app = TestApp::new().await;

    let upload = app.upload("report.txt", b"hello").await;
    assert_eq!(upload.status, StatusCode::OK, "{:?}", upload.body);
    assert_eq!(upload.str_field("original_filename"), Some("report.txt"));
    assert_eq!(
        upload.str_field("message"),
        Some("File uploaded successfully. It will expire in 6 hours.")
    );
    assert!(upload.str_field("expires_at").is_some());

    let handle = upload.str_field("uuid").expect("uuid").to_string();
    let download = app.get(&format!("/sharefile/{handle}")).await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(&download.bytes[..], b"hello");
    assert_eq!(
        download.headers["content-type"],
        "application/octet-stream"
    );
    assert_eq!(
        download.headers["content-disposition"],
        "attachment; filename=\"report.txt\"; filename*=UTF-8''report.txt"
    );
}

#[tokio::test]
async fn test_download_is_repeatable_by_default() {
    let app = TestApp::new().await;
    let handle = app.upload("a.bin", b"abc").await.str_field("uuid").unwrap().to_string();

    for _ in 0..2 {
        let download = app.get(&format!("/sharefile/{handle}")).await;
        assert_eq!(download.status, StatusCode::OK);
        assert_eq!(&download.bytes[..], b"abc");
    }
}

#[tokio::test]
async fn test_delete_on_read_serves_once() {
    let mut config = test_config();
    config.share.delete_on_read = true;
    let app = TestApp::with_config(config).await;
    let handle = app.upload("once.txt", b"secret").await.str_field("uuid").unwrap().to_string();

    let first = app.get(&format!("/sharefile/{handle}")).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(&first.bytes[..], b"secret");

    let second = app.get(&format!("/sharefile/{handle}")).await;
    assert_eq!(second.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_handle_is_not_found() {
    let app = TestApp::new().await;

    for path in [
        "/sharefile/nonexistent-handle",
        "/sharefile/2f1d3c4e-8a51-4c37-9a43-0b6d8c3f5e21",
    ] {
        let response = app.get(path).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(response.str_field("error"), Some("NOT_FOUND"));
        assert_eq!(
            response.str_field("message"),
            Some("File not found or expired.")
        );
    }
}

#[tokio::test]
async fn test_only_issued_handle_spelling_downloads() {
    let app = TestApp::new().await;
    let handle = app.upload("a.txt", b"abc").await.str_field("uuid").unwrap().to_string();

    let simple = handle.replace('-', "");
    for alias in [
        simple,
        format!("%7B{handle}%7D"),
        format!("urn:uuid:{handle}"),
        handle.to_uppercase(),
    ] {
        let response = app.get(&format!("/sharefile/{alias}")).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{alias}");
    }

    assert_eq!(app.get(&format!("/sharefile/{handle}")).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_file_expires_after_retention() {
    let mut config = test_config();
    config.share.retention_seconds = 1;
    config.share.poll_interval_seconds = 1;
    let app = TestApp::with_config(config).await;

    let upload = app.upload("short.txt", b"bye").await;
    assert_eq!(
        upload.str_field("message"),
        Some("File uploaded successfully. It will expire in 1 second.")
    );
    let handle = upload.str_field("uuid").unwrap().to_string();

    tokio::time::sleep(Duration::from_millis(2500)).await;

    let response = app.get(&format!("/sharefile/{handle}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(app.state.store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_uploads_get_distinct_handles() {
    let app = std::sync::Arc::new(TestApp::new().await);

    let mut tasks = Vec::new();
    for i in 0..16 {
        let app = app.clone();
        tasks.push(tokio::spawn(async move {
            let response = app.upload(&format!("f{i}.txt"), format!("{i}").as_bytes()).await;
            response.str_field("uuid").unwrap().to_string()
        }));
    }

    let mut handles = std::collections::HashSet::new();
    for task in tasks {
        handles.insert(task.await.unwrap());
    }
    assert_eq!(handles.len(), 16);
}

#[tokio::test]
async fn test_missing_file_field_is_rejected() {
    let app = TestApp::new().await;
    let response = app.upload_as("attachment", "x.txt", b"data").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.str_field("error"), Some("VALIDATION"));
}

#[tokio::test]
async fn test_bad_filename_is_rejected() {
    let app = TestApp::new().await;
    let response = app.upload("..", b"data").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.state.store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let mut config = test_config();
    config.share.max_upload_size_bytes = 1024;
    let app = TestApp::with_config(config).await;

    // Over the store limit but within the multipart allowance.
    let response = app.upload("big.bin", &vec![7u8; 4096]).await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.str_field("error"), Some("PAYLOAD_TOO_LARGE"));

    // Over the transport limit altogether.
    let response = app.upload("huge.bin", &vec![7u8; 256 * 1024]).await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);

    assert!(app.state.store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_file_is_accepted() {
    let app = TestApp::new().await;
    let upload = app.upload("empty.txt", b"").await;
    assert_eq!(upload.status, StatusCode::OK);

    let handle = upload.str_field("uuid").unwrap().to_string();
    let download = app.get(&format!("/sharefile/{handle}")).await;
    assert_eq!(download.status, StatusCode::OK);
    assert!(download.bytes.is_empty());
}

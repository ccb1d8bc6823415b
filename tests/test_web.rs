//! Integration tests for the HTTP front end.
//!
//! Tests cover:
//! - Rendering the upload form with the about document
//! - Posting images and reading back the results page
//! - Truncation warning and form validation errors

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::*;
use signview::web::{AppState, router};
use std::path::PathBuf;
use tower::ServiceExt;

const BOUNDARY: &str = "signview-test-boundary";

fn multipart_body(files: &[(&str, Vec<u8>)], fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{name}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn app(about_path: PathBuf) -> axum::Router {
    let (annotator, _) = make_annotator(vec![detection(4, 4, 40, 40, 0, 0.92)]);
    router(AppState { annotator, about_path, max_files: 10 }, 64 * 1024 * 1024)
}

async fn body_text(response: axum::response::Response) -> anyhow::Result<String> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

fn post_detect(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/detect")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .expect("valid request")
}

#[tokio::test]
async fn test_index_shows_about_document() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let about = dir.path().join("README_for_App.md");
    std::fs::write(&about, "# Road signs\n\nTrained on **RTSD** & friends.\n")?;

    let response = app(about)
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await?;
    assert!(html.contains("<h1>Road signs</h1>"));
    assert!(html.contains("<strong>RTSD</strong> &amp; friends."));
    assert!(!html.contains("# Road signs"));
    assert!(html.contains(r#"value="above" checked"#));
    Ok(())
}

#[tokio::test]
async fn test_index_tolerates_missing_about() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let response = app(dir.path().join("missing.md"))
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await?;
    assert!(html.contains("Could not load"));
    Ok(())
}

#[tokio::test]
async fn test_detect_renders_results() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let body = multipart_body(
        &[("a.png", png_bytes(64, 64)), ("b.png", png_bytes(48, 48))],
        &[("confidence", "0.5"), ("show_confidence", "on"), ("label_position", "below"), ("box_thickness", "2"), ("font_size", "12")],
    );

    let response = app(dir.path().join("none.md")).oneshot(post_detect(body)).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await?;
    assert!(html.contains("Image 1/2"));
    assert!(html.contains("Image 2/2"));
    assert!(html.contains("<li>2.1 0.92 (confidence: 0.92)</li>"));
    assert!(html.contains(r#"value="below" checked"#));
    Ok(())
}

#[tokio::test]
async fn test_detect_truncates_to_limit() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let files: Vec<(&str, Vec<u8>)> = (0..12).map(|_| ("x.png", png_bytes(16, 16))).collect();
    let body = multipart_body(&files, &[("show_confidence", "on")]);

    let response = app(dir.path().join("none.md")).oneshot(post_detect(body)).await?;

    let html = body_text(response).await?;
    assert!(html.contains("Please upload no more than 10 images"));
    assert!(html.contains("Image 10/10"));
    assert!(!html.contains("Image 11/"));
    Ok(())
}

#[tokio::test]
async fn test_detect_rejects_invalid_settings() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let body = multipart_body(&[("a.png", png_bytes(16, 16))], &[("box_thickness", "11")]);

    let response = app(dir.path().join("none.md")).oneshot(post_detect(body)).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await?.contains("box thickness 11"));
    Ok(())
}

#[tokio::test]
async fn test_detect_without_files_asks_for_images() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let body = multipart_body(&[("", Vec::new())], &[("show_confidence", "on")]);

    let response = app(dir.path().join("none.md")).oneshot(post_detect(body)).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await?.contains("Please choose at least one image"));
    Ok(())
}

#[tokio::test]
async fn test_health() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let response = app(dir.path().join("none.md"))
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(body_text(response).await?, "ok");
    Ok(())
}

//! Browser front end: an upload form and a results page.

pub mod form;
pub mod html;

use anyhow::Context;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::trace::TraceLayer;

use crate::models::StyleOptions;
use crate::pipeline::{SignAnnotator, UploadBatch, UploadedImage};

/// Optional free-text document shown above the form
#[derive(Debug, Clone, PartialEq)]
pub enum AboutDoc {
    Present(String),
    /// Warning text explaining why it isn't shown
    Missing(String),
}

impl AboutDoc {
    pub async fn load(path: &std::path::Path) -> Self {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => AboutDoc::Present(text),
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "about document unavailable");
                AboutDoc::Missing(format!("Could not load {}: {}", path.display(), err))
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub annotator: SignAnnotator,
    pub about_path: PathBuf,
    pub max_files: usize,
}

pub struct WebError(StatusCode, String);

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

fn bad_request(err: impl std::fmt::Display) -> WebError {
    WebError(StatusCode::BAD_REQUEST, err.to_string())
}

fn internal(err: impl std::fmt::Display) -> WebError {
    tracing::error!(%err, "request failed");
    WebError(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

pub fn router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/detect", post(detect))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let about = AboutDoc::load(&state.about_path).await;
    Html(html::render_index(&StyleOptions::default(), &about, state.max_files, None))
}

async fn detect(State(state): State<AppState>, mut multipart: Multipart) -> Result<Html<String>, WebError> {
    let mut files = Vec::new();
    let mut fields = HashMap::new();

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == form::FIELD_IMAGES {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field.bytes().await.map_err(bad_request)?;
            // An empty file input still submits one empty part
            if !bytes.is_empty() {
                files.push(UploadedImage::new(file_name, bytes.to_vec()));
            }
        } else {
            let value = field.text().await.map_err(bad_request)?;
            fields.insert(name, value);
        }
    }

    let style = form::style_from_fields(&fields).map_err(bad_request)?;
    let about = AboutDoc::load(&state.about_path).await;

    if files.is_empty() {
        let page = html::render_index(&style, &about, state.max_files, Some("Please choose at least one image"));
        return Ok(Html(page));
    }

    let batch = UploadBatch::new(files, state.max_files);
    tracing::info!(images = batch.len(), ?style, "processing upload");

    let annotator = state.annotator.clone();
    let max_files = state.max_files;
    let page = tokio::task::spawn_blocking(move || {
        let report = annotator.process_batch(batch, &style);
        html::render_results(&report, &style, &about, max_files)
    })
    .await
    .map_err(internal)?
    .map_err(|e| internal(format!("{:#}", e)))?;

    Ok(Html(page))
}

/// Serve until ctrl-c
pub async fn serve(listen: SocketAddr, state: AppState, body_limit: usize) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind {}", listen))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router(state, body_limit))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("server error")?;

    Ok(())
}

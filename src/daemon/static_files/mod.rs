mod index;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Uri, header},
    response::{Html, IntoResponse, Response},
};
use tokio::fs;
use tracing::{debug, warn};

use super::embedded_assets;
use super::error::ApiError;
use super::media::RangePolicy;
use super::router::AppState;
use super::transfer::serve_file;
use index::inject_server_root;

/// `GET /`: the browser client, with the server root made available to it.
///
/// `<root>/assets/index.html` wins over the copy built into the binary.
pub async fn serve_index(State(state): State<Arc<AppState>>) -> Html<String> {
    let on_disk = state.assets_dir.join("index.html");
    let html = match fs::read_to_string(&on_disk).await {
        Ok(html) => html,
        Err(_) => {
            debug!(path = %on_disk.display(), "Using built-in index page");
            embedded_assets::INDEX_HTML.to_string()
        }
    };

    Html(inject_server_root(&html, &state.root.to_string()))
}

/// `GET /<path>`: any file below the root, with media range support.
///
/// Client assets missing from `<root>/assets` are served from the binary.
pub async fn serve_static(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, ApiError> {
    let raw = uri.path().trim_start_matches('/');
    let resolved = state.root.resolve(raw).map_err(|err| {
        warn!(path = %raw, error = %err, "Rejected static path");
        ApiError::Forbidden("Invalid file path".into())
    })?;

    let is_file = fs::metadata(resolved.as_path())
        .await
        .map(|metadata| metadata.is_file())
        .unwrap_or(false);

    if !is_file {
        if let Some(asset) = embedded_assets::lookup(&resolved.relative_slash()) {
            return Ok(([(header::CONTENT_TYPE, asset.content_type)], asset.body).into_response());
        }
        return Err(ApiError::NotFound("File not found".into()));
    }

    serve_file(&resolved, headers.get(header::RANGE), RangePolicy::Streaming).await
}

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header},
    response::Response,
};
use tokio::{fs, task};
use tracing::{info, warn};

use super::error::ApiError;
use super::media::{self, Disposition, RangePolicy};
use super::router::AppState;
use super::transfer::serve_file;
use crate::application::{archive_file_name, build_zip};
use crate::domain::ResolvedPath;

const DOWNLOAD_PREFIX: &str = "/download/";

/// `GET /download/<path>`: a file, or a folder as a ZIP archive.
pub async fn download(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, ApiError> {
    let raw = uri.path().strip_prefix(DOWNLOAD_PREFIX).unwrap_or_default();
    let resolved = state.root.resolve(raw).map_err(|err| {
        warn!(path = %raw, error = %err, "Rejected download path");
        ApiError::Forbidden("Invalid file path".into())
    })?;

    let metadata = fs::metadata(resolved.as_path())
        .await
        .map_err(|_| ApiError::NotFound(format!("File or folder not found: {resolved}")))?;

    if metadata.is_dir() {
        return download_folder(resolved).await;
    }

    serve_file(&resolved, headers.get(header::RANGE), RangePolicy::Download).await
}

async fn download_folder(folder: ResolvedPath) -> Result<Response, ApiError> {
    let filename = archive_file_name(&folder);
    let shown = folder.to_string();

    let archive = task::spawn_blocking(move || build_zip(folder.as_path()))
        .await?
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    info!(folder = %shown, bytes = archive.len(), "Sending folder archive");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            media::content_disposition(Disposition::Attachment, &filename),
        )
        .header(header::CONTENT_LENGTH, archive.len())
        .body(Body::from(archive))
        .map_err(|err| ApiError::Internal(err.to_string()))
}

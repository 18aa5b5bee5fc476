use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tokio::task;
use tracing::{debug, warn};

use super::error::{ApiError, JsonError};
use super::router::AppState;
use crate::application::{list_all_recursive, list_children};

#[derive(Debug, Deserialize)]
pub struct FilesQuery {
    folder: Option<String>,
}

/// `GET /api/files`: children of `folder`, or every file when no folder is given.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilesQuery>,
) -> Result<Response, JsonError> {
    let Some(folder) = query.folder else {
        let root = state
            .root
            .resolve("")
            .map_err(|_| ApiError::Forbidden("Invalid folder path".into()))?;
        let files = task::spawn_blocking(move || list_all_recursive(&root))
            .await?
            .map_err(|_| ApiError::NotFound("Folder not found".into()))?;
        debug!(files = files.len(), "Listed all files");
        return Ok(Json(files).into_response());
    };

    let folder = if folder == "." { String::new() } else { folder };
    let resolved = state.root.resolve(&folder).map_err(|err| {
        warn!(folder = %folder, error = %err, "Rejected folder path");
        ApiError::Forbidden("Invalid folder path".into())
    })?;

    let entries = task::spawn_blocking(move || list_children(&resolved))
        .await?
        .map_err(|_| ApiError::NotFound("Folder not found".into()))?;

    debug!(folder = %folder, entries = entries.len(), "Listed folder");
    Ok(Json(entries).into_response())
}

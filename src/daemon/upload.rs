use std::sync::Arc;

use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{StatusCode, header},
};
use tracing::{info, warn};

use super::error::ApiError;
use super::router::AppState;
use crate::application::UploadError;
use crate::application::UploadIngestor;
use crate::application::ingest_upload::{sanitize_filename, upload_summary, validate_content_type};

/// `POST /`: store every file part of a multipart form in the upload directory.
///
/// Parts are streamed to disk as they arrive.
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<String, ApiError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    validate_content_type(content_type)?;

    let mut multipart = Multipart::from_request(request, &state)
        .await
        .map_err(|err| multipart_error(err.status(), err.body_text()))?;

    let ingestor = UploadIngestor::new(state.upload_dir.clone());
    let mut accepted = Vec::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| multipart_error(err.status(), err.body_text()))?
    {
        let Some(raw_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let Some(filename) = sanitize_filename(&raw_name) else {
            warn!(filename = %raw_name, "Skipping upload with unusable filename");
            continue;
        };

        let mut pending = ingestor.begin(&filename).await?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|err| multipart_error(err.status(), err.body_text()))?
        {
            pending.write(&chunk).await?;
        }

        if let Some(stored) = pending.finish().await? {
            accepted.push(stored);
        }
    }

    if accepted.is_empty() {
        return Err(UploadError::NoFiles.into());
    }

    info!(files = accepted.len(), dir = %ingestor.dir().display(), "Upload complete");
    Ok(upload_summary(&accepted))
}

/// Body limit breaches keep their 413; anything else is a malformed form.
fn multipart_error(status: StatusCode, text: String) -> UploadError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge
    } else {
        UploadError::Malformed(text)
    }
}

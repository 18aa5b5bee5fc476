use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid content type")]
    InvalidContentType,

    #[error("Missing boundary")]
    MissingBoundary,

    #[error("No file found in request")]
    NoFiles,

    #[error("Malformed multipart body: {0}")]
    Malformed(String),

    #[error("Upload exceeds the size limit")]
    TooLarge,

    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Check that a `Content-Type` value describes a multipart form with a boundary.
pub fn validate_content_type(content_type: &str) -> Result<(), UploadError> {
    if !content_type.starts_with("multipart/form-data") {
        return Err(UploadError::InvalidContentType);
    }

    let has_boundary = content_type.split(';').skip(1).any(|param| {
        param
            .trim()
            .strip_prefix("boundary=")
            .is_some_and(|value| !value.trim_matches('"').is_empty())
    });
    if !has_boundary {
        return Err(UploadError::MissingBoundary);
    }

    Ok(())
}

/// Reduce a client-declared filename to its last path segment.
///
/// Returns `None` when nothing usable remains.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next()?.trim();
    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        return None;
    }
    Some(name.to_string())
}

/// Writes uploaded files into the upload directory.
#[derive(Debug, Clone)]
pub struct UploadIngestor {
    dir: PathBuf,
}

impl UploadIngestor {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Start receiving `filename`. Bytes go to a hidden temporary file that
    /// only takes the final name in [`PendingUpload::finish`].
    ///
    /// The temporary name does not embed `filename`, so any name the
    /// filesystem accepts can be stored.
    pub async fn begin(&self, filename: &str) -> Result<PendingUpload, UploadError> {
        let temp_path = self.dir.join(temp_name());
        let file = File::create(&temp_path).await?;

        Ok(PendingUpload {
            filename: filename.to_string(),
            temp_path,
            final_path: self.dir.join(filename),
            file: Some(file),
            written: 0,
        })
    }
}

fn temp_name() -> String {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);

    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!(".upload-{nonce:x}-{seq}")
}

/// A file being received. Dropping it without [`finish`](Self::finish)
/// removes the partial data.
#[derive(Debug)]
pub struct PendingUpload {
    filename: String,
    temp_path: PathBuf,
    final_path: PathBuf,
    file: Option<File>,
    written: u64,
}

impl PendingUpload {
    pub async fn write(&mut self, chunk: &[u8]) -> Result<(), UploadError> {
        if let Some(file) = self.file.as_mut() {
            file.write_all(chunk).await?;
            self.written += chunk.len() as u64;
        }
        Ok(())
    }

    /// Move the received bytes into place. Empty uploads are discarded and
    /// yield `None`.
    pub async fn finish(mut self) -> Result<Option<String>, UploadError> {
        let Some(mut file) = self.file.take() else {
            return Ok(None);
        };
        file.flush().await?;
        drop(file);

        if self.written == 0 {
            debug!(file = %self.filename, "Discarding empty upload");
            fs::remove_file(&self.temp_path).await?;
            return Ok(None);
        }

        if let Err(err) = fs::rename(&self.temp_path, &self.final_path).await {
            let _ = fs::remove_file(&self.temp_path).await;
            return Err(err.into());
        }
        info!(file = %self.filename, bytes = self.written, "Upload stored");
        Ok(Some(std::mem::take(&mut self.filename)))
    }
}

impl Drop for PendingUpload {
    fn drop(&mut self) {
        if self.file.is_some() {
            let _ = std::fs::remove_file(&self.temp_path);
        }
    }
}

/// Human-readable summary of a successful upload.
pub fn upload_summary(accepted: &[String]) -> String {
    match accepted {
        [single] => format!("File '{single}' uploaded successfully"),
        files => format!("{} files uploaded successfully", files.len()),
    }
}

use std::io::{self, ErrorKind, SeekFrom};
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use bytes::Bytes;
use futures_util::Stream;
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use super::error::ApiError;
use super::media::{self, RangePolicy};
use crate::domain::{ByteRange, ResolvedPath};

/// Upper bound on the bytes read from disk per body chunk.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Serve `file` in full or, for range-eligible media, the requested range.
///
/// All validation happens before the response is built, so a failure here
/// still gets a proper status code. Once streaming has started, errors can
/// only abort the body.
pub async fn serve_file(
    file: &ResolvedPath,
    range_header: Option<&HeaderValue>,
    policy: RangePolicy,
) -> Result<Response, ApiError> {
    let metadata = match fs::metadata(file.as_path()).await {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => return Err(ApiError::NotFound(format!("File not found: {file}"))),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!("File not found: {file}")));
        }
        Err(err) => return Err(ApiError::Internal(err.to_string())),
    };
    let size = metadata.len();
    let media = media::classify(file.as_path());

    let range = match range_header.and_then(|value| value.to_str().ok()) {
        Some(value) if policy.allows(&media) => ByteRange::parse(value, size)
            .map_err(|_| ApiError::RangeNotSatisfiable { size })?,
        _ => None,
    };

    let filename = file.file_name().unwrap_or_default();
    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, media::content_type(&media))
        .header(header::ACCEPT_RANGES, "bytes")
        .header(
            header::CONTENT_DISPOSITION,
            media::content_disposition(media::disposition(&media), &filename),
        );
    if policy == RangePolicy::Download {
        builder = builder.header(header::X_CONTENT_TYPE_OPTIONS, "nosniff");
    }

    let mut handle = File::open(file.as_path())
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?;

    let response = match range {
        Some(range) => {
            handle
                .seek(SeekFrom::Start(range.start()))
                .await
                .map_err(|err| ApiError::Internal(err.to_string()))?;
            debug!(
                path = %file,
                start = range.start(),
                end = range.end(),
                size,
                "Serving partial content"
            );

            builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_RANGE, range.content_range(size))
                .header(header::CONTENT_LENGTH, range.len())
                .header(header::CACHE_CONTROL, "no-cache")
                .body(Body::from_stream(TransferStream::new(
                    handle.take(range.len()),
                    file.to_string(),
                    range.len(),
                )))
        }
        None => {
            debug!(path = %file, size, "Serving full content");

            builder
                .status(StatusCode::OK)
                .header(header::CONTENT_LENGTH, size)
                .body(Body::from_stream(TransferStream::new(
                    handle.take(size),
                    file.to_string(),
                    size,
                )))
        }
    };

    response.map_err(|err| ApiError::Internal(err.to_string()))
}

/// File body that reads bounded chunks and notices early termination.
///
/// A body dropped before all bytes were sent means the client went away,
/// which ends the transfer quietly.
struct TransferStream<R> {
    inner: ReaderStream<R>,
    path: String,
    remaining: u64,
    done: bool,
}

impl<R: AsyncRead> TransferStream<R> {
    fn new(reader: R, path: String, length: u64) -> Self {
        Self {
            inner: ReaderStream::with_capacity(reader, CHUNK_SIZE),
            path,
            remaining: length,
            done: false,
        }
    }
}

impl<R: AsyncRead + Unpin> Stream for TransferStream<R> {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.remaining = this.remaining.saturating_sub(chunk.len() as u64);
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(err))) => {
                this.done = true;
                warn!(path = %this.path, error = %err, "Aborting transfer after read failure");
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.done = true;
                if this.remaining > 0 {
                    warn!(
                        path = %this.path,
                        missing = this.remaining,
                        "File ended before the announced length"
                    );
                    this.remaining = 0;
                    return Poll::Ready(Some(Err(io::Error::new(
                        ErrorKind::UnexpectedEof,
                        "file shrank during transfer",
                    ))));
                }
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<R> Drop for TransferStream<R> {
    fn drop(&mut self) {
        if !self.done && self.remaining > 0 {
            debug!(
                path = %self.path,
                remaining = self.remaining,
                "Client disconnected before transfer completed"
            );
        }
    }
}

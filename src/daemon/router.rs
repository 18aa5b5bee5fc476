use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::download::download;
use super::files_api::list_files;
use super::static_files::{serve_index, serve_static};
use super::upload::upload_files;
use crate::domain::ServerRoot;
use crate::infrastructure::paths::ServerPaths;

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";
const ALLOWED_HEADERS: &str = "Range, Content-Type";
const PREFLIGHT_MAX_AGE: u64 = 86400;

/// Shared, read-only state for all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub root: ServerRoot,
    pub upload_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub max_upload_bytes: Option<usize>,
}

impl AppState {
    pub fn new(paths: ServerPaths, max_upload_bytes: Option<usize>) -> Self {
        Self {
            root: paths.root,
            upload_dir: paths.upload_dir,
            assets_dir: paths.assets_dir,
            max_upload_bytes,
        }
    }
}

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = match state.max_upload_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/", get(serve_index).post(upload_files).layer(body_limit))
        .route("/index.html", get(serve_index))
        .route("/api/files", get(list_files))
        .route("/api/files/", get(list_files))
        .route("/download/{*path}", get(download))
        .route("/{*path}", get(serve_static))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(answer_options))
                .layer(cors_layer()),
        )
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([header::RANGE, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(PREFLIGHT_MAX_AGE))
}

/// Answer `OPTIONS` for any path, preflight or not. Sits outside the CORS
/// layer, which only decorates the remaining methods.
async fn answer_options(request: Request, next: Next) -> Response {
    if request.method() != Method::OPTIONS {
        return next.run(request).await;
    }

    let mut response = StatusCode::OK.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from(PREFLIGHT_MAX_AGE),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use tower::ServiceExt;

    fn router() -> (tempfile::TempDir, Router) {
        let tmp = tempfile::tempdir().unwrap();
        let paths = ServerPaths::new(tmp.path(), None).unwrap();
        (tmp, create_router(Arc::new(AppState::new(paths, None))))
    }

    #[tokio::test]
    async fn test_bare_options_request() {
        let (_tmp, router) = router();

        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/download/anything")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, HEAD, OPTIONS"
        );
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Range, Content-Type"
        );
        assert_eq!(response.headers()[header::ACCESS_CONTROL_MAX_AGE], "86400");
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let (_tmp, router) = router();

        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/download/song.mp3")
                    .header(header::ORIGIN, "http://192.168.1.20:8080")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "range")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, HEAD, OPTIONS"
        );
    }

    #[tokio::test]
    async fn test_cross_origin_get_is_allowed() {
        let (_tmp, router) = router();

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/files")
                    .header(header::ORIGIN, "http://192.168.1.20:8080")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}

//! Development server.
//!
//! Serves the output directory, pushes HMR events over Server-Sent Events
//! and exposes per-artifact build status.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{
        IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::get,
};
use tokio::net::TcpListener;
use tokio_stream::{Stream, StreamExt, wrappers::ReceiverStream};
use tower_http::cors::{Any, CorsLayer};

use crate::dev::{HmrEvent, SharedState, error_overlay};
use crate::error::{CliError, Result};

pub const HMR_EVENTS_PATH: &str = "/__kiln_hmr__";
pub const HMR_CLIENT_PATH: &str = "/__kiln_hmr__.js";
pub const STATUS_PATH: &str = "/__kiln_status__";

const HMR_CLIENT_SCRIPT: &str = include_str!("../../assets/dev/hmr-client.js");

/// A bound, not yet serving, development server.
///
/// Binding happens up front so the endpoint is reachable before any dev
/// session starts.
pub struct DevServer {
    listener: TcpListener,
    state: SharedState,
}

impl DevServer {
    /// Bind `host:port`. Port 0 picks a free port.
    pub async fn bind(host: &str, port: u16, state: SharedState) -> Result<Self> {
        let listener = TcpListener::bind((host, port)).await.map_err(|e| {
            CliError::Server(format!("Failed to bind to {}:{}: {}", host, port, e))
        })?;
        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the task is dropped or the listener fails.
    pub async fn serve(self) -> Result<()> {
        let app = router(self.state);
        axum::serve(self.listener, app)
            .await
            .map_err(|e| CliError::Server(format!("Server error: {}", e)))
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route(HMR_EVENTS_PATH, get(handle_sse))
        .route(HMR_CLIENT_PATH, get(handle_client_script))
        .route(STATUS_PATH, get(handle_status))
        // The desktop host probes this path while the renderer boots
        .route("/undefined", get(|| async { "undefined" }))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .fallback(handle_request)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn handle_sse(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let (id, rx) = state.register_client();
    tracing::debug!(client = id, "HMR client connected");

    state.send_to(id, &HmrEvent::Connected { id });

    let stream = ReceiverStream::new(rx).map(|data| Ok(Event::default().data(data)));

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

async fn handle_client_script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        HMR_CLIENT_SCRIPT,
    )
}

async fn handle_status(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.statuses())
}

/// Serve a file from the output directory.
async fn handle_request(State(state): State<SharedState>, uri: Uri) -> Response {
    let path = uri.path();

    let Some(relative) = sanitize_path(path) else {
        return not_found(path);
    };

    if let Some(artifact) = page_artifact(&relative) {
        if let Some(error) = state.status(&artifact).error() {
            return html(error_overlay::generate_error_overlay(&artifact, error).into_bytes());
        }
    }

    let file_path = state.out_dir().join(&relative);
    if !file_path.is_file() {
        return not_found(path);
    }

    match tokio::fs::read(&file_path).await {
        Ok(content) => {
            let content_type = determine_content_type(&relative);
            if content_type.starts_with("text/html") {
                html(inject_hmr_script(&content))
            } else {
                (
                    [
                        (header::CONTENT_TYPE, content_type),
                        (header::CACHE_CONTROL, "no-cache"),
                    ],
                    content,
                )
                    .into_response()
            }
        }
        Err(e) => {
            tracing::warn!(path = %file_path.display(), error = %e, "failed to read file");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to read {}", path)).into_response()
        }
    }
}

fn html(body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

fn not_found(path: &str) -> Response {
    (StatusCode::NOT_FOUND, format!("File not found: {}", path)).into_response()
}

/// Map a request path onto the output directory. Rejects traversal.
fn sanitize_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim_start_matches('/');
    let relative = Path::new(trimmed);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(relative.to_path_buf())
}

/// `search.html` -> `search`, for top-level pages only.
fn page_artifact(relative: &Path) -> Option<String> {
    if relative.components().count() != 1 {
        return None;
    }
    relative
        .to_str()?
        .strip_suffix(".html")
        .map(str::to_string)
}

/// Add the HMR client script before the closing `</body>` tag.
pub fn inject_hmr_script(content: &[u8]) -> Vec<u8> {
    let html = String::from_utf8_lossy(content);
    let script_tag = format!(r#"<script src="{}"></script>"#, HMR_CLIENT_PATH);

    if let Some(pos) = html.rfind("</body>") {
        let mut result = String::with_capacity(html.len() + script_tag.len() + 4);
        result.push_str(&html[..pos]);
        result.push_str("  ");
        result.push_str(&script_tag);
        result.push('\n');
        result.push_str(&html[pos..]);
        return result.into_bytes();
    }

    let mut result = html.into_owned();
    result.push('\n');
    result.push_str(&script_tag);
    result.into_bytes()
}

fn determine_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    match extension {
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "html" => "text/html; charset=utf-8",
        "css" => "text/css",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_before_body() {
        let result = inject_hmr_script(b"<html><body><h1>Test</h1></body></html>");
        let result = String::from_utf8(result).unwrap();

        let script_pos = result.find(r#"<script src="/__kiln_hmr__.js"></script>"#).unwrap();
        let body_pos = result.find("</body>").unwrap();
        assert!(script_pos < body_pos);
    }

    #[test]
    fn test_inject_without_body() {
        let result = String::from_utf8(inject_hmr_script(b"<h1>Test</h1>")).unwrap();
        assert!(result.ends_with(r#"<script src="/__kiln_hmr__.js"></script>"#));
    }

    #[test]
    fn test_sanitize_rejects_traversal() {
        assert_eq!(sanitize_path("/app.js"), Some(PathBuf::from("app.js")));
        assert_eq!(
            sanitize_path("/assets/logo.svg"),
            Some(PathBuf::from("assets/logo.svg"))
        );
        assert_eq!(sanitize_path("/../secret"), None);
        assert_eq!(sanitize_path("/assets/../../x"), None);
    }

    #[test]
    fn test_page_artifact() {
        assert_eq!(page_artifact(Path::new("search.html")).as_deref(), Some("search"));
        assert_eq!(page_artifact(Path::new("app.js")), None);
        assert_eq!(page_artifact(Path::new("assets/x.html")), None);
    }

    #[test]
    fn test_content_types() {
        assert_eq!(determine_content_type(Path::new("app.js.map")), "application/json");
        assert_eq!(determine_content_type(Path::new("font.woff2")), "font/woff2");
        assert_eq!(determine_content_type(Path::new("blob")), "application/octet-stream");
    }
}

//! HTTP API server.
//!
//! ## Endpoints
//!
//! ### Stream Management
//! - `POST /api/stream/test` - Start a synthetic test-pattern stream
//! - `POST /api/stream/start` - Start an RTSP to HLS conversion
//! - `POST /api/stream/stop` - Stop a stream (id in body)
//! - `POST /api/stream/{id}/stop` - Stop a stream (id in path)
//! - `GET  /api/stream/status` - Status of all tracked streams
//! - `GET  /streams/{id}/{filename}` - Serve playlist and segment files
//!
//! ### Overlays
//! - `GET    /api/overlays` - List overlays
//! - `POST   /api/overlays` - Create overlay
//! - `GET    /api/overlays/{id}` - Get overlay
//! - `PUT    /api/overlays/{id}` - Update overlay
//! - `DELETE /api/overlays/{id}` - Delete overlay
//! - `POST   /api/overlays/bulk-delete` - Delete several overlays
//!
//! ### System
//! - `GET /api/health` - Health check
//!
//! All failures are converted to a structured JSON `{"error": ...}` body at
//! this boundary; nothing crashes the serving process. On SIGINT/SIGTERM the
//! server stops accepting requests and terminates every tracked transcoder
//! before exiting.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::config::Config;
use crate::error::Error;
use crate::overlay::{MemoryOverlayStore, OverlayStore};
use crate::stream::StreamSupervisor;

pub mod handlers;
pub mod types;

use handlers::{
    bulk_delete_overlays, create_overlay, delete_overlay, get_overlay, health, list_overlays,
    serve_stream_file, start_stream, start_test_stream, stop_stream, stop_stream_by_path,
    stream_status, update_overlay,
};
use types::ErrorResponse;

// =============================================================================
// App State
// =============================================================================

/// Shared application state for HTTP handlers.
pub struct AppState {
    pub supervisor: Arc<StreamSupervisor>,
    pub overlays: Arc<dyn OverlayStore>,
    /// Base URL used when building playlist URLs in start responses.
    pub public_base_url: String,
    /// Origins that receive CORS allow headers.
    pub cors_origins: Vec<String>,
}

pub type SharedState = Arc<AppState>;

// =============================================================================
// HTTP API Server
// =============================================================================

/// Build the API router over the given state.
pub fn router(state: SharedState) -> Router {
    Router::new()
        // Stream management
        .route("/api/stream/test", post(start_test_stream))
        .route("/api/stream/start", post(start_stream))
        .route("/api/stream/stop", post(stop_stream))
        .route("/api/stream/{stream_id}/stop", post(stop_stream_by_path))
        .route("/api/stream/status", get(stream_status))
        // HLS file serving
        .route("/streams/{stream_id}/{filename}", get(serve_stream_file))
        // Overlays
        .route("/api/overlays", get(list_overlays).post(create_overlay))
        .route("/api/overlays/bulk-delete", post(bulk_delete_overlays))
        .route(
            "/api/overlays/{overlay_id}",
            get(get_overlay).put(update_overlay).delete(delete_overlay),
        )
        // System
        .route("/api/health", get(health))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            cors_middleware,
        ))
        .with_state(state)
}

/// Start the HTTP API server and block until shutdown.
///
/// Listens on the configured address, serves until an interrupt or terminate
/// signal arrives, then tears down all tracked streams before returning.
pub async fn serve(config: Config) -> Result<()> {
    let supervisor = Arc::new(StreamSupervisor::new(&config.streams)?);
    let overlays: Arc<dyn OverlayStore> = Arc::new(MemoryOverlayStore::new());

    let state = Arc::new(AppState {
        supervisor: Arc::clone(&supervisor),
        overlays,
        public_base_url: config.server.effective_base_url(),
        cors_origins: config.cors.allowed_origins.clone(),
    });

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    tracing::info!(
        %addr,
        streams_root = %config.streams.root.display(),
        "starting overlaycast HTTP API"
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    // Best-effort teardown of every transcoder; must not block exit
    supervisor.shutdown_all().await;

    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received, stopping server...");
}

// =============================================================================
// CORS Middleware
// =============================================================================

/// CORS handling for the browser frontend.
///
/// Answers `OPTIONS` preflights directly and decorates responses for
/// requests whose `Origin` is on the configured allow-list; other origins
/// get no allow headers.
async fn cors_middleware(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let allowed_origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .filter(|origin| state.cors_origins.iter().any(|allowed| allowed == origin))
        .and_then(|origin| HeaderValue::from_str(origin).ok());

    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        if let Some(origin) = allowed_origin {
            apply_cors_headers(&mut response, origin);
            response.headers_mut().insert(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
            );
            response.headers_mut().insert(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type, Authorization"),
            );
        }
        return response;
    }

    let mut response = next.run(request).await;
    if let Some(origin) = allowed_origin {
        apply_cors_headers(&mut response, origin);
    }
    response
}

fn apply_cors_headers(response: &mut Response, origin: HeaderValue) {
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));
}

// =============================================================================
// Error Handling
// =============================================================================

/// Error wrapper converting [`Error`] into JSON HTTP responses.
pub struct AppError(Error);

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = match &self.0 {
            Error::SpawnFailed { .. } => ErrorResponse {
                error: "Transcoder failed to start. Check the RTSP URL or transcoder installation."
                    .to_string(),
                details: self.0.diagnostic_excerpt(),
            },
            _ => ErrorResponse {
                error: self.0.to_string(),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

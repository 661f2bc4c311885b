//! Stream management handlers.
//!
//! Start/stop/status for transcoder-backed streams, plus playlist and
//! segment file serving and the health check.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use super::super::types::{
    HealthResponse, StartStreamRequest, StartStreamResponse, StopStreamRequest,
    StopStreamResponse, StreamStatusEntry, StreamStatusResponse,
};
use super::super::{AppError, SharedState};
use crate::error::Error;
use crate::stream::{StreamRecord, StreamSource};

/// Playlist content type (Apple HLS).
const CONTENT_TYPE_M3U8: &str = "application/vnd.apple.mpegurl";

/// MPEG transport stream segment content type.
const CONTENT_TYPE_TS: &str = "video/mp2t";

/// POST /api/stream/test - Start a synthetic test-pattern stream.
pub(crate) async fn start_test_stream(
    State(state): State<SharedState>,
) -> Result<Json<StartStreamResponse>, AppError> {
    let record = state.supervisor.start(StreamSource::TestPattern).await?;
    Ok(Json(started_response(
        &state,
        &record,
        "Test stream started with generated pattern",
    )))
}

/// POST /api/stream/start - Start an RTSP to HLS conversion.
pub(crate) async fn start_stream(
    State(state): State<SharedState>,
    Json(req): Json<StartStreamRequest>,
) -> Result<Json<StartStreamResponse>, AppError> {
    let source = StreamSource::rtsp(req.rtsp_url.unwrap_or_default())?;
    let record = state.supervisor.start(source).await?;
    Ok(Json(started_response(
        &state,
        &record,
        "Stream started. Segments appear after a short startup delay.",
    )))
}

/// POST /api/stream/stop - Stop a stream addressed by request body.
pub(crate) async fn stop_stream(
    State(state): State<SharedState>,
    Json(req): Json<StopStreamRequest>,
) -> Result<Json<StopStreamResponse>, AppError> {
    let stream_id = req.stream_id.unwrap_or_default();
    stop_by_id(&state, &stream_id).await
}

/// POST /api/stream/{stream_id}/stop - Stop a stream addressed by path.
pub(crate) async fn stop_stream_by_path(
    State(state): State<SharedState>,
    Path(stream_id): Path<String>,
) -> Result<Json<StopStreamResponse>, AppError> {
    stop_by_id(&state, &stream_id).await
}

async fn stop_by_id(
    state: &SharedState,
    stream_id: &str,
) -> Result<Json<StopStreamResponse>, AppError> {
    if stream_id.is_empty() {
        return Err(Error::stream_not_found(stream_id).into());
    }
    state.supervisor.stop(stream_id).await?;
    Ok(Json(StopStreamResponse {
        status: "stopped".to_string(),
    }))
}

/// GET /api/stream/status - Status of all tracked streams, live-polled.
pub(crate) async fn stream_status(State(state): State<SharedState>) -> Json<StreamStatusResponse> {
    let active_streams = state
        .supervisor
        .status()
        .await
        .into_iter()
        .map(StreamStatusEntry::from)
        .collect();
    Json(StreamStatusResponse { active_streams })
}

/// GET /streams/{stream_id}/{filename} - Serve a playlist or segment file.
///
/// 404 covers both "stream unknown" and "file not produced yet"; players
/// retry the playlist until segments appear.
pub(crate) async fn serve_stream_file(
    State(state): State<SharedState>,
    Path((stream_id, filename)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let path = state.supervisor.resolve_stream_file(&stream_id, &filename)?;
    let data = tokio::fs::read(&path)
        .await
        .map_err(|e| Error::io(format!("reading {}", path.display()), e))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type_for(&filename))],
        data,
    ))
}

/// GET /api/health - Service health and dependency availability.
pub(crate) async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        transcoder: if state.supervisor.transcoder_available() {
            "available".to_string()
        } else {
            "not found".to_string()
        },
        overlay_store: state.overlays.backend().to_string(),
        active_streams: state.supervisor.active_count(),
    })
}

fn started_response(
    state: &SharedState,
    record: &StreamRecord,
    message: &str,
) -> StartStreamResponse {
    StartStreamResponse {
        stream_id: record.stream_id.clone(),
        hls_url: format!(
            "{}/streams/{}/index.m3u8",
            state.public_base_url, record.stream_id
        ),
        status: "started".to_string(),
        message: message.to_string(),
    }
}

/// Content type negotiated by file extension.
fn content_type_for(filename: &str) -> String {
    if filename.ends_with(".m3u8") {
        CONTENT_TYPE_M3U8.to_string()
    } else if filename.ends_with(".ts") {
        CONTENT_TYPE_TS.to_string()
    } else {
        mime_guess::from_path(filename)
            .first_or_octet_stream()
            .to_string()
    }
}

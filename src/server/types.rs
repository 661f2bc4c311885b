//! Request and response types for the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::overlay::{Position, Size};
use crate::stream::StreamStatus;

// =============================================================================
// Stream Types
// =============================================================================

/// Request to start an RTSP stream.
#[derive(Debug, Deserialize)]
pub struct StartStreamRequest {
    /// RTSP source URL (required, `rtsp://`-prefixed).
    pub rtsp_url: Option<String>,
}

/// Response for a successfully started stream.
#[derive(Debug, Serialize, Deserialize)]
pub struct StartStreamResponse {
    pub stream_id: String,
    /// Externally reachable playlist URL. The playlist appears only after
    /// the transcoder has produced its first segments.
    pub hls_url: String,
    pub status: String,
    pub message: String,
}

/// Request to stop a stream via the body-addressed route.
#[derive(Debug, Deserialize)]
pub struct StopStreamRequest {
    pub stream_id: Option<String>,
}

/// Response for a stopped stream.
#[derive(Debug, Serialize, Deserialize)]
pub struct StopStreamResponse {
    pub status: String,
}

/// One entry in the stream status listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct StreamStatusEntry {
    pub stream_id: String,
    pub rtsp_url: String,
    pub started_at: String,
    pub running: bool,
}

impl From<StreamStatus> for StreamStatusEntry {
    fn from(status: StreamStatus) -> Self {
        Self {
            stream_id: status.stream_id,
            rtsp_url: status.source,
            started_at: format_timestamp(status.started_at),
            running: status.running,
        }
    }
}

/// Response listing all tracked streams.
#[derive(Debug, Serialize, Deserialize)]
pub struct StreamStatusResponse {
    pub active_streams: Vec<StreamStatusEntry>,
}

// =============================================================================
// Overlay Types
// =============================================================================

/// Request to create an overlay.
#[derive(Debug, Deserialize)]
pub struct CreateOverlayRequest {
    /// Overlay kind: "text" or "image".
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub content: Option<String>,
    pub position: Option<Position>,
    pub size: Option<Size>,
}

/// Request to update an overlay; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateOverlayRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub content: Option<String>,
    pub position: Option<Position>,
    pub size: Option<Size>,
}

/// Request to delete several overlays at once.
#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    #[serde(default)]
    pub overlay_ids: Vec<String>,
}

/// Response for a single overlay deletion.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteOverlayResponse {
    pub message: String,
}

/// Response for a bulk deletion.
#[derive(Debug, Serialize, Deserialize)]
pub struct BulkDeleteResponse {
    pub message: String,
    pub deleted_count: usize,
}

// =============================================================================
// Common Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub transcoder: String,
    pub overlay_store: String,
    pub active_streams: usize,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Captured diagnostic output, present for spawn failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Format a timestamp for API responses.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

//! Overlay CRUD handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::super::types::{
    BulkDeleteRequest, BulkDeleteResponse, CreateOverlayRequest, DeleteOverlayResponse,
    UpdateOverlayRequest,
};
use super::super::{AppError, SharedState};
use crate::error::Error;
use crate::overlay::{Overlay, OverlayDraft, OverlayKind, OverlayPatch};

/// GET /api/overlays - List all overlays, newest first.
pub(crate) async fn list_overlays(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Overlay>>, AppError> {
    Ok(Json(state.overlays.list().await?))
}

/// POST /api/overlays - Create an overlay.
pub(crate) async fn create_overlay(
    State(state): State<SharedState>,
    Json(req): Json<CreateOverlayRequest>,
) -> Result<(StatusCode, Json<Overlay>), AppError> {
    let kind = OverlayKind::parse(req.kind.as_deref().unwrap_or_default())?;
    let draft = OverlayDraft {
        kind,
        content: req.content.unwrap_or_default(),
        position: req.position.unwrap_or_default(),
        size: req.size.unwrap_or_default(),
    };
    draft.validate()?;

    let overlay = state.overlays.create(draft).await?;
    tracing::info!(overlay = %overlay.id, kind = ?overlay.kind, "overlay created");
    Ok((StatusCode::CREATED, Json(overlay)))
}

/// GET /api/overlays/{overlay_id} - Fetch one overlay.
pub(crate) async fn get_overlay(
    State(state): State<SharedState>,
    Path(overlay_id): Path<String>,
) -> Result<Json<Overlay>, AppError> {
    Ok(Json(state.overlays.get(&overlay_id).await?))
}

/// PUT /api/overlays/{overlay_id} - Update an overlay.
pub(crate) async fn update_overlay(
    State(state): State<SharedState>,
    Path(overlay_id): Path<String>,
    Json(req): Json<UpdateOverlayRequest>,
) -> Result<Json<Overlay>, AppError> {
    let kind = match req.kind.as_deref() {
        Some(kind) => Some(OverlayKind::parse(kind)?),
        None => None,
    };
    let patch = OverlayPatch {
        kind,
        content: req.content,
        position: req.position,
        size: req.size,
    };
    patch.validate()?;

    let overlay = state.overlays.update(&overlay_id, patch).await?;
    tracing::info!(overlay = %overlay_id, "overlay updated");
    Ok(Json(overlay))
}

/// DELETE /api/overlays/{overlay_id} - Delete one overlay.
pub(crate) async fn delete_overlay(
    State(state): State<SharedState>,
    Path(overlay_id): Path<String>,
) -> Result<Json<DeleteOverlayResponse>, AppError> {
    state.overlays.delete(&overlay_id).await?;
    tracing::info!(overlay = %overlay_id, "overlay deleted");
    Ok(Json(DeleteOverlayResponse {
        message: "Overlay deleted successfully".to_string(),
    }))
}

/// POST /api/overlays/bulk-delete - Delete several overlays at once.
pub(crate) async fn bulk_delete_overlays(
    State(state): State<SharedState>,
    Json(req): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    if req.overlay_ids.is_empty() {
        return Err(Error::InvalidRequest("no overlay IDs provided".to_string()).into());
    }

    let deleted_count = state.overlays.delete_many(&req.overlay_ids).await?;
    tracing::info!(count = deleted_count, "overlays bulk deleted");
    Ok(Json(BulkDeleteResponse {
        message: format!("Deleted {deleted_count} overlays"),
        deleted_count,
    }))
}

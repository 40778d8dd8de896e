//! Caption endpoints
//!
//! Available only when the caption model and image annotator keys are
//! configured; otherwise both endpoints answer 400.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::services::caption_writer::CaptionSummary;
use crate::AppState;

/// POST /captions/generate
///
/// Generates captions for every content record in "Suggest Captions"
/// status.
pub async fn generate_captions(State(state): State<AppState>) -> ApiResult<Json<CaptionSummary>> {
    let writer = state
        .captions
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("Caption generation is not configured".to_string()))?;

    let summary = writer.generate_for_suggested().await?;
    Ok(Json(summary))
}

#[derive(Debug, Serialize)]
pub struct CollectCaptionsResponse {
    pub report: String,
}

/// GET /clients/:id/captions
///
/// Bullet-list report of the client's finished posts for the current cycle.
pub async fn collect_captions(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> ApiResult<Json<CollectCaptionsResponse>> {
    let writer = state
        .captions
        .as_ref()
        .ok_or_else(|| ApiError::BadRequest("Caption generation is not configured".to_string()))?;

    let client = {
        let registry = state.registry.read().await;
        registry
            .get(client_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Client {} not found", client_id)))?
    };

    let report = writer.collect_ready(&client).await?;
    Ok(Json(CollectCaptionsResponse { report }))
}

/// Build caption routes
pub fn caption_routes() -> Router<AppState> {
    Router::new()
        .route("/captions/generate", post(generate_captions))
        .route("/clients/:id/captions", get(collect_captions))
}

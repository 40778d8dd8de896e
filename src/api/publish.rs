//! Publish endpoint

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::services::post_publisher::PublishSummary;
use crate::services::PostPublisher;
use crate::AppState;

/// POST /clients/:id/publish
///
/// Runs one publish pass over the client's next-post folder.
pub async fn publish_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> ApiResult<Json<PublishSummary>> {
    let client = {
        let registry = state.registry.read().await;
        registry
            .get(client_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Client {} not found", client_id)))?
    };

    let publisher = PostPublisher::new(
        state.store.clone(),
        state.docs.clone(),
        state.config.content_db_id.clone(),
    );
    let summary = publisher.publish(&client).await?;
    Ok(Json(summary))
}

/// Build publish routes
pub fn publish_routes() -> Router<AppState> {
    Router::new().route("/clients/:id/publish", post(publish_client))
}

//! Buffer audit endpoint

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;

use crate::error::ApiResult;
use crate::services::buffer_auditor::AuditSummary;
use crate::services::{BufferAuditor, ReadyContentCounter};
use crate::AppState;

/// POST /audit/buffer
///
/// Runs the buffer audit over every registered client as of today.
/// Safe to trigger repeatedly; shortfalls already tracked are not
/// duplicated.
pub async fn run_buffer_audit(State(state): State<AppState>) -> ApiResult<Json<AuditSummary>> {
    let auditor = BufferAuditor::new(
        state.docs.clone(),
        state.tracker.clone(),
        ReadyContentCounter::new(state.store.clone()),
    );

    let registry = state.registry.read().await;
    let summary = auditor.run(&registry, Utc::now().date_naive()).await;
    Ok(Json(summary))
}

/// Build audit routes
pub fn audit_routes() -> Router<AppState> {
    Router::new().route("/audit/buffer", post(run_buffer_audit))
}

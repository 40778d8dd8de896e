//! cadencer - content cadence scheduler and post sequencing service
//!
//! Decides, on a rolling 4-week cycle, whether each managed client has
//! enough ready content for the upcoming week (opening tracker tasks for
//! shortfalls), and turns a folder of freshly prepared files into ordered,
//! validated content records in the document service.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult, Error, Result};

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::models::ClientRegistry;
use crate::services::{CaptionWriter, DocumentService, FileStore, TaskTracker};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Loaded once at startup, flushed after each mutation
    pub registry: Arc<RwLock<ClientRegistry>>,
    pub store: Arc<dyn FileStore>,
    pub docs: Arc<dyn DocumentService>,
    pub tracker: Arc<dyn TaskTracker>,
    /// Present only when the caption model keys are configured
    pub captions: Option<Arc<CaptionWriter>>,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        config: Config,
        registry: ClientRegistry,
        store: Arc<dyn FileStore>,
        docs: Arc<dyn DocumentService>,
        tracker: Arc<dyn TaskTracker>,
        captions: Option<Arc<CaptionWriter>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(RwLock::new(registry)),
            store,
            docs,
            tracker,
            captions,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::client_routes())
        .merge(api::audit_routes())
        .merge(api::publish_routes())
        .merge(api::caption_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

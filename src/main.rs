//! cadencer service entry point
//!
//! Resolves configuration from the environment, loads the client registry
//! snapshot, wires up the external service clients and serves the HTTP API.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cadencer::config::Config;
use cadencer::models::ClientRegistry;
use cadencer::services::{
    http, CaptionWriter, DriveClient, GeminiClient, NotionClient, TodoistClient, VisionClient,
};
use cadencer::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting cadencer");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let registry = ClientRegistry::load(&config.registry_path)?;
    info!(
        path = %config.registry_path.display(),
        clients = registry.len(),
        "Client registry ready"
    );

    let http_client = http::build_client()?;

    let store = Arc::new(DriveClient::new(
        http_client.clone(),
        config.drive_token.clone(),
    ));
    let docs = Arc::new(NotionClient::new(
        http_client.clone(),
        config.notion_token.clone(),
    ));
    let tracker = Arc::new(TodoistClient::new(
        http_client.clone(),
        config.todoist_token.clone(),
        config.task_project.clone(),
        config.task_assignee.clone(),
    ));

    // Captions are optional; the rest of the service runs without them
    let captions = match (&config.vision_api_key, &config.gemini_api_key) {
        (Some(vision_key), Some(gemini_key)) => {
            let annotator = Arc::new(VisionClient::new(http_client.clone(), vision_key.clone()));
            let model = Arc::new(GeminiClient::new(http_client.clone(), gemini_key.clone()));
            Some(Arc::new(CaptionWriter::new(
                docs.clone(),
                store.clone(),
                annotator,
                model,
                config.content_db_id.clone(),
            )))
        }
        _ => {
            info!("Caption model keys not set, caption endpoints disabled");
            None
        }
    };

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config, registry, store, docs, tracker, captions);
    let app = cadencer::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
